use sizes_service::{build_router, AppConfig, AppState, CleanupManager};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let (mut config, source) = AppConfig::load_or_default(Some(CONFIG_PATH));

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("sizes_service={}", config.logging.level).parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(source = %source, "Loaded configuration: {:?}", config.server.name);

    if let Some(port) = args.get(1).and_then(|p| p.parse::<u16>().ok()) {
        config.server.port = port;
    }
    if let Some(bind_addr) = args.get(2) {
        config.server.bind_addr = bind_addr.clone();
    }

    tokio::fs::create_dir_all(&config.storage.upload_dir).await?;
    tokio::fs::create_dir_all(&config.storage.output_dir).await?;

    let app_state = AppState::new(config.clone());

    CleanupManager::new(app_state.outputs.clone(), config.output_ttl())
        .start_background_cleanup(config.cleanup_interval());

    let app = build_router(app_state);

    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP Server listening on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /upload              - Upload a .csv/.xlsx/.xls file (multipart field 'file')");
    tracing::info!("  GET  /download/:file_id   - Download the reshaped CSV");
    tracing::info!("Example:");
    tracing::info!("  curl -F 'file=@stock.csv' http://{}/upload", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
