use crate::pipeline::{load_table, reshape_to_csv, ReshapeSummary};
use crate::state::{content_disposition, download_name, AppState, OutputRecord, TempUpload};
use crate::tabular::TableFormat;
use crate::utils::SizesError;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const UPLOAD_FIELD: &str = "file";

/// Error returned from a handler, rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub SizesError);

impl From<SizesError> for ApiError {
    fn from(err: SizesError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SizesError::UnsupportedFormat(_)
            | SizesError::MissingUpload
            | SizesError::UploadError(_) => StatusCode::BAD_REQUEST,
            SizesError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SizesError::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Error processing request");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "Rejected request");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_id: Uuid,
    pub file_name: String,
    pub download_name: String,
    pub download_url: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub malformed_cells: usize,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sizes-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    tracing::info!("Received file upload request");

    let (file_name, bytes) = read_upload_field(&mut multipart).await?;
    tracing::info!(file_name = %file_name, bytes = bytes.len(), "Received file");

    let format = TableFormat::from_file_name(&file_name)?;
    let file_id = Uuid::new_v4();
    let storage = &state.config.storage;

    let upload = TempUpload::write(&storage.upload_dir, file_id, format, &bytes).await?;
    tokio::fs::create_dir_all(&storage.output_dir)
        .await
        .map_err(SizesError::from)?;
    let output_path = storage.output_dir.join(format!("{}.csv", file_id));

    let task_output = output_path.clone();
    let summary: ReshapeSummary = tokio::task::spawn_blocking(move || {
        let dataset = load_table(upload.path(), format);
        drop(upload);
        reshape_to_csv(dataset?, &task_output)
    })
    .await
    .map_err(|e| SizesError::TaskError(e.to_string()))??;

    let download_name = download_name(&file_name);
    state
        .outputs
        .register(OutputRecord::new(
            file_id,
            output_path,
            download_name.clone(),
            summary.rows,
        ))
        .await;

    Ok(Json(UploadResponse {
        message: "File uploaded and processed".to_string(),
        file_id,
        file_name,
        download_name,
        download_url: format!("/download/{}", file_id),
        rows: summary.rows,
        columns: summary.columns,
        malformed_cells: summary.malformed.len(),
    }))
}

async fn read_upload_field(multipart: &mut Multipart) -> Result<(String, Bytes), SizesError> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(upload_error)?;
        return Ok((file_name, bytes));
    }
    Err(SizesError::MissingUpload)
}

fn upload_error(err: MultipartError) -> SizesError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SizesError::UploadTooLarge(err.body_text())
    } else {
        SizesError::UploadError(err.body_text())
    }
}

pub async fn download(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&file_id).map_err(|_| SizesError::NotFound(file_id.clone()))?;
    let record = state
        .outputs
        .get(&id)
        .await
        .ok_or_else(|| SizesError::NotFound(file_id.clone()))?;

    let bytes = match tokio::fs::read(&record.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            state.outputs.remove(&id).await;
            return Err(SizesError::NotFound(file_id).into());
        }
        Err(e) => return Err(SizesError::from(e).into()),
    };

    tracing::info!(file_id = %id, bytes = bytes.len(), "Serving download");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&record.download_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
