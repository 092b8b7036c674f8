//! uyuni-sd — Uyuni / SUSE Manager service discovery daemon.
//!
//! Loads a YAML config, then polls the configured server on a fixed
//! interval. Every cycle's target groups are written to stdout as one JSON
//! line, ready for a scraper (or anything else) to consume.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use uyuni_sd::config::SdConfig;
use uyuni_sd::discovery::poller::run_poller;
use uyuni_sd::rpc::http::HttpApiClient;
use uyuni_sd::rpc::UyuniApi;

const DEFAULT_CONFIG_PATH: &str = "uyuni-sd.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uyuni_sd=info".into()),
        )
        .with_target(false)
        .init();

    info!("uyuni-sd v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = SdConfig::from_file(Path::new(&config_path))
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;
    info!(host = %cfg.host, interval_secs = cfg.refresh_interval_secs, "Configuration loaded");

    let api: Arc<dyn UyuniApi> = Arc::new(
        HttpApiClient::new(&cfg.host).context("Failed to build Uyuni API client")?,
    );

    let (updates_tx, mut updates_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = tokio::spawn(run_poller(api, cfg, updates_tx, shutdown_rx));

    // Publish target groups until ctrl-c.
    loop {
        tokio::select! {
            maybe_groups = updates_rx.recv() => {
                match maybe_groups {
                    Some(groups) => {
                        let line = serde_json::to_string(&groups)
                            .context("Failed to serialize target groups")?;
                        println!("{line}");
                    }
                    None => break,
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    error!(error = %err, "Failed to listen for shutdown signal");
                }
                info!("Shutting down");
                let _ = shutdown_tx.send(true);
                break;
            }
        }
    }

    // Unblocks the poller if it is mid-send, so the join below cannot hang.
    drop(updates_rx);
    poller.await.context("Discovery poller panicked")?;
    Ok(())
}
