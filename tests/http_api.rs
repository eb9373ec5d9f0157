use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sizes_service::server::UploadResponse;
use sizes_service::{build_router, AppConfig, AppState};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "sizes-test-boundary";

struct TestApp {
    router: Router,
    dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(|_| {})
    }

    fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.output_dir = dir.path().join("outputs");
        adjust(&mut config);
        let router = build_router(AppState::new(config));
        Self { router, dir }
    }

    fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    fn output_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("outputs")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn upload(&self, field: &str, file_name: &str, content: &[u8]) -> (StatusCode, Vec<u8>) {
        let (status, _, body) = self.send(upload_request(field, file_name, content)).await;
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

fn upload_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

fn error_message(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
    value["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let (status, _, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "ok");
}

#[tokio::test]
async fn csv_upload_is_reshaped_and_downloadable() {
    let app = TestApp::new();
    let csv = b"style,S,M,L,XL\nT-100,3,0,-1,2.7\nT-200,,,,\n";

    let (status, body) = app.upload("file", "stock.csv", csv).await;
    assert_eq!(status, StatusCode::OK);

    let response: UploadResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.rows, 2);
    assert_eq!(response.columns, vec!["style", "S", "M", "L", "XL", "sizes"]);
    assert_eq!(response.malformed_cells, 0);
    assert_eq!(response.download_name, "stock_sizes.csv");
    assert_eq!(files_in(&app.upload_dir()), 0);

    let (status, headers, body) = app.get(&response.download_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("filename=\"stock_sizes.csv\""));
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "style,S,M,L,XL,sizes\nT-100,3,0,-1,2.7,\"S*3,XL*2,\"\nT-200,,,,,\n"
    );
}

#[tokio::test]
async fn xlsx_upload_is_reshaped_to_csv() {
    let app = TestApp::new();
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "style").unwrap();
    sheet.write_string(0, 1, "S").unwrap();
    sheet.write_string(0, 2, "M").unwrap();
    sheet.write_string(1, 0, "007").unwrap();
    sheet.write_number(1, 1, 3.0).unwrap();
    sheet.write_number(1, 2, 2.7).unwrap();
    sheet.write_number(2, 0, 12.0).unwrap();
    sheet.write_boolean(2, 1, true).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let (status, body) = app.upload("file", "Stock.XLSX", &bytes).await;
    assert_eq!(status, StatusCode::OK);
    let response: UploadResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.download_name, "Stock_sizes.csv");
    assert_eq!(response.malformed_cells, 1);
    assert_eq!(files_in(&app.upload_dir()), 0);

    let (status, _, body) = app.get(&response.download_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "style,S,M,sizes\n007,3,2.7,\"S*3,M*2,\"\n12,true,,\n"
    );
}

#[tokio::test]
async fn vanished_output_file_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.upload("file", "stock.csv", b"id,S\n1,2\n").await;
    assert_eq!(status, StatusCode::OK);
    let response: UploadResponse = serde_json::from_slice(&body).unwrap();

    std::fs::remove_file(app.output_dir().join(format!("{}.csv", response.file_id))).unwrap();

    let (status, _, body) = app.get(&response.download_url).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(error_message(&body).contains("Output not found"));
    let (status, _, _) = app.get(&response.download_url).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn uploads_over_the_size_limit_are_rejected() {
    let app = TestApp::with_config(|config| config.storage.max_upload_mb = 0);
    let (status, body) = app.upload("file", "stock.csv", b"id,S\n1,2\n").await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(error_message(&body).contains("Upload too large"));
    assert_eq!(files_in(&app.upload_dir()), 0);
    assert_eq!(files_in(&app.output_dir()), 0);
}

#[tokio::test]
async fn non_numeric_cells_are_counted_not_fatal() {
    let app = TestApp::new();
    let (status, body) = app
        .upload("file", "mixed.csv", b"id,S,M\n1,many,2\n2,1,few\n")
        .await;

    assert_eq!(status, StatusCode::OK);
    let response: UploadResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.malformed_cells, 2);
}

#[tokio::test]
async fn unsupported_suffix_is_rejected_before_touching_disk() {
    let app = TestApp::new();
    let (status, body) = app.upload("file", "notes.txt", b"id,S\n1,2\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("Unsupported file type"));
    assert_eq!(files_in(&app.upload_dir()), 0);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.upload("attachment", "stock.csv", b"id\n1\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No file field in upload");
}

#[tokio::test]
async fn malformed_csv_is_unprocessable_and_cleaned_up() {
    let app = TestApp::new();
    let (status, body) = app.upload("file", "bad.csv", b"id,S\n1,2,3\n").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_message(&body).contains("line 2"));
    assert_eq!(files_in(&app.upload_dir()), 0);
}

#[tokio::test]
async fn corrupt_workbook_is_unprocessable() {
    let app = TestApp::new();
    let (status, _) = app.upload("file", "stock.xlsx", b"not a workbook").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(files_in(&app.upload_dir()), 0);
}

#[tokio::test]
async fn unknown_downloads_are_not_found() {
    let app = TestApp::new();

    let (status, _, _) = app
        .get("/download/6f1c1f0e-8f3a-4a57-9d3e-3f0c2b1a0d11")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app.get("/download/..%2Fconfig.toml").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reuploading_output_adds_second_sizes_column() {
    let app = TestApp::new();
    let (_, body) = app.upload("file", "stock.csv", b"style,S,M\nA,1,2\n").await;
    let first: UploadResponse = serde_json::from_slice(&body).unwrap();
    let (_, _, output) = app.get(&first.download_url).await;

    let (status, body) = app.upload("file", "stock_sizes.csv", &output).await;
    assert_eq!(status, StatusCode::OK);
    let second: UploadResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(second.columns, vec!["style", "S", "M", "sizes", "sizes"]);

    let (_, _, output) = app.get(&second.download_url).await;
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "style,S,M,sizes,sizes\nA,1,2,\"S*1,M*2,\",\"S*1,M*2,\"\n"
    );
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let app = TestApp::new();
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/upload")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let (_, headers, _) = app.send(preflight("http://localhost:5173")).await;
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let (_, headers, _) = app.send(preflight("http://evil.example")).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
