//! Uyuni / SUSE Manager service discovery for metrics scraping.
//!
//! Periodically queries a Uyuni server's RPC API for monitoring-entitled
//! systems and their exposed metrics endpoints, and republishes them as
//! target groups a scraper can consume.

pub mod config;
pub mod discovery;
pub mod error;
pub mod rpc;

pub use config::SdConfig;
pub use discovery::TargetGroup;
pub use error::{ConfigError, DiscoveryError};
