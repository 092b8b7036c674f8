//! Error taxonomy for the discovery daemon.
//!
//! Two layers: `ConfigError` is startup-fatal and raised before any cycle is
//! scheduled; `DiscoveryError` is cycle-fatal and reported to the poller,
//! which retries on the next tick. Logout failure is deliberately absent
//! here: it is logged at warn level inside the cycle and never propagated.

use thiserror::Error;

/// Configuration problems, detected at load time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Uyuni SD configuration requires a host")]
    MissingHost,

    #[error("Uyuni SD configuration requires a username")]
    MissingUsername,

    #[error("Uyuni SD configuration requires a password")]
    MissingPassword,

    #[error("Uyuni SD configuration requires refresh_interval_secs to be positive")]
    InvalidInterval,

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Failures of a single refresh cycle. A cycle either returns the complete
/// target set or one of these and zero records.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Uyuni server URL is not valid: {0}")]
    InvalidServerUrl(String),

    #[error("Failed to reach Uyuni API: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Unable to login to Uyuni API: {0}")]
    Auth(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Unable to get {dataset}: {source}")]
    RemoteCall {
        dataset: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Refresh cycle cancelled")]
    Cancelled,
}

impl DiscoveryError {
    /// Wrap a dataset fetch failure with the name of the failing dataset.
    pub fn remote_call<E>(dataset: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RemoteCall {
            dataset,
            source: Box::new(source),
        }
    }
}
