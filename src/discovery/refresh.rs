//! One refresh cycle against the Uyuni API.
//!
//! Login, fetch the three datasets, join them by system ID, derive one label
//! set per endpoint, logout. The session token is scoped to exactly one
//! cycle; once login succeeds, logout is attempted on every exit path.
//! Failures before the join abort the cycle with zero records; there is no
//! partial-success mode.

use std::collections::BTreeMap;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::SdConfig;
use crate::error::DiscoveryError;
use crate::rpc::{NetworkInfo, UyuniApi};

use super::labels::endpoint_labels;
use super::TargetGroup;

/// Run one discovery cycle and return the full target set, tagged with the
/// configured server host as its source. The shutdown signal is observed at
/// the start of the cycle and between remote calls.
pub async fn refresh(
    api: &dyn UyuniApi,
    cfg: &SdConfig,
    shutdown: &watch::Receiver<bool>,
) -> Result<Vec<TargetGroup>, DiscoveryError> {
    if *shutdown.borrow() {
        return Err(DiscoveryError::Cancelled);
    }
    let start = Instant::now();

    let token = api.login(&cfg.username, cfg.password.expose()).await?;

    // Logout pairs with every successful login, whatever the cycle did.
    let outcome = fetch_targets(api, &token, shutdown).await;
    if let Err(err) = api.logout(&token).await {
        warn!(error = %err, "Failed to log out from Uyuni API");
    }
    let targets = outcome?;

    info!(
        targets = targets.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Discovery cycle complete"
    );
    Ok(vec![TargetGroup {
        targets,
        labels: BTreeMap::new(),
        source: cfg.host.clone(),
    }])
}

/// The cycle body between login and logout: fetch, join, derive.
async fn fetch_targets(
    api: &dyn UyuniApi,
    token: &str,
    shutdown: &watch::Receiver<bool>,
) -> Result<Vec<BTreeMap<String, String>>, DiscoveryError> {
    if *shutdown.borrow() {
        return Err(DiscoveryError::Cancelled);
    }

    let groups_by_system = api.system_groups_for_monitored(token).await?;
    if groups_by_system.is_empty() {
        // Normal outcome, distinct from a fetch failure.
        debug!("Found 0 monitoring-entitled systems");
        return Ok(Vec::new());
    }
    let system_ids: Vec<i64> = groups_by_system.keys().copied().collect();

    if *shutdown.borrow() {
        return Err(DiscoveryError::Cancelled);
    }
    let endpoints = api.endpoints(token, &system_ids).await?;

    if *shutdown.borrow() {
        return Err(DiscoveryError::Cancelled);
    }
    let network_by_system = api.network_info(token, &system_ids).await?;

    // Lenient join: an endpoint whose system lacks a network identity or
    // group memberships still produces a record, with empty defaults.
    let default_network = NetworkInfo::default();
    let mut targets = Vec::with_capacity(endpoints.len());
    for endpoint in &endpoints {
        let groups = groups_by_system
            .get(&endpoint.system_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let network = network_by_system
            .get(&endpoint.system_id)
            .unwrap_or(&default_network);
        if !network.hostname.is_empty() {
            debug!(
                host = %network.hostname,
                primary_fqdn = %network.primary_fqdn,
                "Found endpoint"
            );
        }
        targets.push(endpoint_labels(endpoint, groups, network));
    }
    Ok(targets)
}
