//! Uyuni API surface — wire types and the session seam.
//!
//! The daemon only ever talks to the server through the `UyuniApi` trait.
//! The production implementation lives in [`http`]; tests substitute mocks.
//! Method names and positional argument shapes are fixed by the server:
//!
//!   auth.login(user, pass) -> token
//!   auth.logout(token)
//!   system.listSystemGroupsForSystemsWithEntitlement(token, entitlement)
//!   system.getNetworkForSystems(token, system_ids)
//!   system.monitoring.listEndpoints(token, system_ids)

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::DiscoveryError;

pub mod http;

/// Only systems carrying this entitlement are considered for discovery.
pub const MONITORING_ENTITLEMENT: &str = "monitoring_entitled";

/// A system group a monitored host belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemGroup {
    pub id: i64,
    pub name: String,
}

/// Group memberships of one entitled system, as returned by
/// `system.listSystemGroupsForSystemsWithEntitlement`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemGroupMembership {
    #[serde(rename = "id")]
    pub system_id: i64,
    pub system_groups: Vec<SystemGroup>,
}

/// Network identity of one system. At most one per system ID per cycle;
/// `Default` is the all-empty identity used for lenient joins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkInfo {
    pub system_id: i64,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub primary_fqdn: String,
    #[serde(default)]
    pub ip: String,
}

/// One monitoring endpoint exposed by a system. A system may expose any
/// number of them; every field besides the system ID may be empty.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointInfo {
    pub system_id: i64,
    #[serde(default)]
    pub endpoint_name: String,
    /// 0 means unspecified, the scraper's default applies.
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub exporter_name: String,
}

/// Typed remote calls against one Uyuni server. One session token is scoped
/// to exactly one refresh cycle; implementations perform no internal retry.
#[async_trait]
pub trait UyuniApi: Send + Sync {
    /// Authenticate and obtain a session token.
    async fn login(&self, user: &str, pass: &str) -> Result<String, DiscoveryError>;

    /// Release the session token. Callers treat failure as best-effort.
    async fn logout(&self, token: &str) -> Result<(), DiscoveryError>;

    /// Group memberships of all monitoring-entitled systems, keyed by system
    /// ID. Systems without the entitlement are absent, which also fixes the
    /// universe of systems for the rest of the cycle.
    async fn system_groups_for_monitored(
        &self,
        token: &str,
    ) -> Result<HashMap<i64, Vec<SystemGroup>>, DiscoveryError>;

    /// Network identity per system, keyed by system ID.
    async fn network_info(
        &self,
        token: &str,
        system_ids: &[i64],
    ) -> Result<HashMap<i64, NetworkInfo>, DiscoveryError>;

    /// Monitoring endpoints for the given systems, in server order. Not
    /// keyed: several endpoints may share a system ID.
    async fn endpoints(
        &self,
        token: &str,
        system_ids: &[i64],
    ) -> Result<Vec<EndpointInfo>, DiscoveryError>;
}
