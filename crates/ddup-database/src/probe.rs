//! Periodic storage liveness probe.
//!
//! Observes reachability and logs failures. It never touches session state.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::stores::Stores;

/// Spawn the probe loop. It stops when `shutdown` flips to `true`.
pub fn spawn_liveness_probe(
    stores: Stores,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Storage liveness probe started");
        let mut ticker = tokio::time::interval(interval);
        let mut failing = false;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Storage liveness probe stopping");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match stores.ping().await {
                        Ok(()) => {
                            if failing {
                                info!("Storage reachable again");
                            }
                            failing = false;
                            debug!("Storage ping ok");
                        }
                        Err(e) => {
                            failing = true;
                            error!(error = %e, "Storage ping failed");
                        }
                    }
                }
            }
        }
    })
}
