//! Periodic purge of dead session rows.
//!
//! Correctness never depends on this task: expired rows are already
//! rejected by the ledger. It only keeps the table small.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use ddup_core::config::{MAX_RETENTION_HOURS, SessionConfig};
use ddup_core::error::AppError;
use ddup_database::SessionStore;

/// Deletes rows that have been invalid or expired for longer than the
/// retention window.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Session store to purge.
    store: Arc<dyn SessionStore>,
    /// How long dead rows are kept.
    retention: Duration,
    /// Time between sweeps.
    interval: StdDuration,
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            retention: Duration::hours(config.retention_hours.min(MAX_RETENTION_HOURS) as i64),
            interval: StdDuration::from_secs(config.cleanup_interval_seconds),
        }
    }

    /// Runs one sweep. Returns the number of rows deleted.
    pub async fn run_cleanup(&self) -> Result<u64, AppError> {
        let before = Utc::now() - self.retention;
        let purged = self.store.purge_stale(before).await?;
        if purged > 0 {
            info!(purged, "Session cleanup completed");
        }
        Ok(purged)
    }

    /// Spawns the sweep loop. It stops when `shutdown` flips to `true`.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "Session cleanup task started"
            );
            let mut ticker = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Session cleanup task stopping");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cleanup().await {
                            error!(error = %e, "Session cleanup failed");
                        }
                    }
                }
            }
        })
    }
}
