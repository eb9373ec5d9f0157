use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub cleanup: CleanupConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    pub output_ttl_minutes: u64,
    pub cleanup_interval_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Where the running configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { reason: Option<String> },
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults { reason: None } => f.write_str("defaults"),
            ConfigSource::Defaults { reason: Some(r) } => write!(f, "defaults ({})", r),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "sizes-service".to_string(),
                bind_addr: "0.0.0.0".to_string(),
                port: 8002,
            },
            cors: CorsConfig {
                allowed_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ],
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("./data/uploads"),
                output_dir: PathBuf::from("./data/outputs"),
                max_upload_mb: 50,
            },
            cleanup: CleanupConfig {
                output_ttl_minutes: 60,
                cleanup_interval_minutes: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> crate::utils::errors::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::utils::errors::SizesError::ConfigError(e.to_string()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> crate::utils::errors::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::utils::errors::SizesError::ConfigError(e.to_string()))
    }

    /// Load `path` if given, falling back to defaults when it is absent or
    /// unreadable. The second value records which source was used.
    pub fn load_or_default(path: Option<&str>) -> (Self, ConfigSource) {
        let Some(p) = path else {
            return (Self::default(), ConfigSource::Defaults { reason: None });
        };
        match Self::load_from_file(p) {
            Ok(config) => (config, ConfigSource::File(PathBuf::from(p))),
            Err(e) => (
                Self::default(),
                ConfigSource::Defaults {
                    reason: Some(e.to_string()),
                },
            ),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.storage.max_upload_mb * 1024 * 1024
    }

    pub fn output_ttl(&self) -> Duration {
        Duration::from_secs(self.cleanup.output_ttl_minutes * 60)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup.cleanup_interval_minutes.max(1) * 60)
    }
}
