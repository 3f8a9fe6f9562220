use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::features::files::services::FileService;

/// Background sweep that permanently removes files marked for deletion
pub struct PurgeWorker {
    file_service: Arc<FileService>,
    period: Duration,
}

impl PurgeWorker {
    pub fn new(file_service: Arc<FileService>, period: Duration) -> Self {
        Self {
            file_service,
            period,
        }
    }

    /// Run the sweep in a background loop
    pub async fn run(&self) {
        tracing::info!("Starting purge worker (every {:?})", self.period);

        let mut interval = interval(self.period);
        // A slow sweep must not cause a burst of catch-up sweeps
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.sweep_once().await;
        }
    }

    async fn sweep_once(&self) {
        match self.file_service.purge_sweep().await {
            Ok(report) if report.purged + report.failed > 0 => {
                tracing::info!(
                    "Purge sweep: purged={}, skipped={}, failed={}",
                    report.purged,
                    report.skipped,
                    report.failed
                );
            }
            Ok(_) => tracing::debug!("Purge sweep found nothing to do"),
            Err(e) => tracing::error!("Error running purge sweep: {:?}", e),
        }
    }
}
