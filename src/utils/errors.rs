use thiserror::Error;

#[derive(Error, Debug)]
pub enum SizesError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Table has no header row")]
    EmptyTable,

    #[error("Malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("No file field in upload")]
    MissingUpload,

    #[error("Upload error: {0}")]
    UploadError(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("Output not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Background task failed: {0}")]
    TaskError(String),
}

pub type Result<T> = std::result::Result<T, SizesError>;

impl SizesError {
    /// Whether the error was caused by the uploaded content rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SizesError::UnsupportedFormat(_)
                | SizesError::EmptyTable
                | SizesError::MalformedRow { .. }
                | SizesError::MissingUpload
                | SizesError::UploadError(_)
                | SizesError::UploadTooLarge(_)
                | SizesError::CsvError(_)
                | SizesError::WorkbookError(_)
        )
    }
}
