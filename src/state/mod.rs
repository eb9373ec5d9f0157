pub mod cleanup;
pub mod storage;

pub use cleanup::{CleanupManager, CleanupReport};
pub use storage::{content_disposition, download_name, OutputRecord, OutputRegistry, TempUpload};

use crate::utils::AppConfig;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub outputs: OutputRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            outputs: OutputRegistry::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
