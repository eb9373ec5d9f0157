use crate::tabular::TableFormat;
use crate::utils::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// An uploaded file on disk for the duration of one request. The file is
/// removed when the guard is dropped, whether or not processing succeeded.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub async fn write(dir: &Path, id: Uuid, format: TableFormat, bytes: &[u8]) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let upload = Self {
            path: dir.join(format!("{}.{}", id, format.extension())),
        };
        tokio::fs::write(&upload.path, bytes).await?;
        info!(path = %upload.path.display(), bytes = bytes.len(), "Saved upload to disk");
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed upload from disk"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove upload"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub id: Uuid,
    #[serde(skip)]
    pub path: PathBuf,
    pub download_name: String,
    pub rows: usize,
    pub created_at: u64,
}

impl OutputRecord {
    pub fn new(id: Uuid, path: PathBuf, download_name: String, rows: usize) -> Self {
        Self {
            id,
            path,
            download_name,
            rows,
            created_at: super::now_secs(),
        }
    }

    pub fn is_expired(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.created_at) > ttl.as_secs()
    }
}

/// Produced CSV files, addressable by id until they expire.
#[derive(Debug, Clone, Default)]
pub struct OutputRegistry {
    records: Arc<RwLock<HashMap<Uuid, OutputRecord>>>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, record: OutputRecord) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn get(&self, id: &Uuid) -> Option<OutputRecord> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &Uuid) -> Option<OutputRecord> {
        self.records.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Remove and return every record older than `ttl`.
    pub async fn take_expired(&self, now: u64, ttl: Duration) -> Vec<OutputRecord> {
        let mut records = self.records.write().await;
        let expired: Vec<Uuid> = records
            .values()
            .filter(|r| r.is_expired(now, ttl))
            .map(|r| r.id)
            .collect();
        expired
            .iter()
            .filter_map(|id| records.remove(id))
            .collect()
    }
}

/// Name offered to the browser for a processed upload.
pub fn download_name(original: &str) -> String {
    format!("{}_sizes.csv", crate::utils::file_stem(original))
}

/// `Content-Disposition` value with an ASCII fallback name and the exact
/// name percent-encoded as `filename*`.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut encoded = String::with_capacity(name.len());
    for b in name.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            encoded.push(b as char);
        } else {
            encoded.push_str(&format!("%{:02X}", b));
        }
    }
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
