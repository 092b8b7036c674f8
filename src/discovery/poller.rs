//! Periodic driver for the refresh cycle.
//!
//! Runs one cycle immediately on startup, then on a fixed interval. Each
//! successful cycle's target groups are republished on the channel; a failed
//! cycle is logged and the next tick retries independently, with no backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{error, info};

use crate::config::SdConfig;
use crate::error::DiscoveryError;
use crate::rpc::UyuniApi;

use super::refresh::refresh;
use super::TargetGroup;

/// Drive refresh cycles until the shutdown signal flips or the consumer
/// goes away.
pub async fn run_poller(
    api: Arc<dyn UyuniApi>,
    cfg: SdConfig,
    updates: mpsc::Sender<Vec<TargetGroup>>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        host = %cfg.host,
        interval_secs = cfg.refresh_interval_secs,
        "Discovery poller starting"
    );

    let mut interval = time::interval(Duration::from_secs(cfg.refresh_interval_secs));
    loop {
        // First tick fires immediately, so the initial cycle runs on startup.
        tokio::select! {
            _ = interval.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Discovery poller stopping");
                    return;
                }
                continue;
            }
        }

        match refresh(api.as_ref(), &cfg, &shutdown).await {
            Ok(groups) => {
                if updates.send(groups).await.is_err() {
                    info!("Target consumer dropped, discovery poller stopping");
                    return;
                }
            }
            Err(DiscoveryError::Cancelled) => {
                info!("Discovery poller stopping");
                return;
            }
            Err(err) => error!(error = %err, "Discovery cycle failed"),
        }
    }
}
