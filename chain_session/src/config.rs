//! Dashboard configuration: parsing, validation, and loading.
//!
//! A small TOML document drives the session layer:
//! - `default_interval`: bucket width a fresh view starts at
//! - `[cache]`: TTLs for snapshot views and scope listings, in seconds
//! - `[display]`: IANA timezone the pivot's time labels render in
//!
//! Every field has a default, so the empty document is a valid config.
//! The timezone is validated eagerly at load time; a bad zone name fails
//! the load instead of surfacing on the first rendered view.
//!
//! Entrypoints:
//! - Parse from a TOML string: [`load_config_str`]
//! - Parse from a file path: [`load_config_path`]

use std::time::Duration;

use chain_core::models::Interval;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid TOML for [`DashboardConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `display.timezone` is not a known IANA zone name.
    #[error("unknown timezone: {0}")]
    Timezone(String),
}

/// Top-level dashboard settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    /// Bucket width a fresh view starts at.
    pub default_interval: Interval,
    /// Cache TTLs.
    pub cache: CacheConfig,
    /// Presentation settings.
    pub display: DisplayConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_interval: Interval::Min5,
            cache: CacheConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// TTLs for the two caches the session layer runs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
    /// Seconds a computed view stays fresh. Snapshot data is polled, so
    /// this stays short.
    pub data_ttl_secs: u64,
    /// Seconds a scope listing (symbols, expiries, dates) stays fresh.
    pub listing_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_ttl_secs: 30,
            listing_ttl_secs: 60,
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DisplayConfig {
    /// IANA zone the pivot's HH:MM column labels render in.
    pub timezone: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl DashboardConfig {
    /// TTL for computed views.
    pub fn data_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.data_ttl_secs)
    }

    /// TTL for scope listings.
    pub fn listing_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.listing_ttl_secs)
    }

    /// Parsed display timezone.
    pub fn display_tz(&self) -> Result<Tz, ConfigError> {
        self.display
            .timezone
            .parse()
            .map_err(|_| ConfigError::Timezone(self.display.timezone.clone()))
    }
}

/// Parse and validate a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> Result<DashboardConfig, ConfigError> {
    let config: DashboardConfig = toml::from_str(toml_str)?;
    config.display_tz()?;
    Ok(config)
}

/// Read a configuration TOML file from disk, parse, and validate it.
///
/// See [`load_config_str`] for validation details.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> Result<DashboardConfig, ConfigError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    load_config_str(&text)
}
