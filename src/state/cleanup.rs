use crate::state::{now_secs, OutputRegistry};
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

pub struct CleanupManager {
    outputs: OutputRegistry,
    output_ttl: Duration,
}

impl CleanupManager {
    pub fn new(outputs: OutputRegistry, output_ttl: Duration) -> Self {
        Self {
            outputs,
            output_ttl,
        }
    }

    pub async fn run_cleanup(&self) -> CleanupReport {
        self.run_cleanup_at(now_secs()).await
    }

    pub async fn run_cleanup_at(&self, now: u64) -> CleanupReport {
        let mut report = CleanupReport::default();

        for record in self.outputs.take_expired(now, self.output_ttl).await {
            report.outputs_expired += 1;

            let size = tokio::fs::metadata(&record.path)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            match tokio::fs::remove_file(&record.path).await {
                Ok(()) => {
                    report.files_deleted += 1;
                    report.bytes_freed += size;
                    info!(file_id = %record.id, "Deleted expired output");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(file_id = %record.id, path = %record.path.display(), error = %e, "Failed to delete expired output");
                }
            }
        }

        if report.outputs_expired > 0 {
            info!(
                outputs_expired = report.outputs_expired,
                files_deleted = report.files_deleted,
                bytes_freed = report.bytes_freed,
                "Cleanup completed"
            );
        }

        report
    }

    pub fn start_background_cleanup(self, cleanup_interval: Duration) {
        tokio::spawn(async move {
            let mut timer = interval(cleanup_interval);

            loop {
                timer.tick().await;

                self.run_cleanup().await;
            }
        });
    }
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub outputs_expired: usize,
    pub files_deleted: usize,
    pub bytes_freed: u64,
}
