//! Daemon configuration, loaded from a YAML file.
//!
//! The surrounding process owns where the file lives; this module owns the
//! shape and the load-time validation. Every rejection is a distinct
//! `ConfigError` variant so startup failures name the exact field at fault.

use std::fmt;
use std::ops::Deref;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Default refresh interval when the config omits it.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

/// A credential that zeroes its buffer on drop and redacts itself from any
/// Debug output. There is no Serialize impl, so it cannot round-trip into
/// logs or emitted records.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Deref for Secret {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Secret::new)
    }
}

/// Configuration for Uyuni-based service discovery.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdConfig {
    /// Base URL of the Uyuni server, e.g. `https://uyuni.example.com`.
    pub host: String,
    pub username: String,
    pub password: Secret,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl SdConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: SdConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Reject incomplete configuration before any cycle is scheduled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.username.is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingPassword);
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}
