use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::retention::{DEFAULT_INTERVAL_HOURS, DEFAULT_MAX_AGE_DAYS};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Upload directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadsConfig {
    /// Directory scanned and cleaned; never created by sweepbox
    #[serde(default = "default_upload_root")]
    pub root: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            root: default_upload_root(),
        }
    }
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("./uploads")
}

/// Retention scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Gates whether the background scheduler is started at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u32,
    /// How long shutdown waits for an in-flight scan
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
}

impl CleanupConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_age_days: default_max_age_days(),
            interval_hours: default_interval_hours(),
            stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_age_days() -> u32 {
    DEFAULT_MAX_AGE_DAYS
}

fn default_interval_hours() -> u32 {
    DEFAULT_INTERVAL_HOURS
}

fn default_stop_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.uploads.root, PathBuf::from("./uploads"));
        assert!(config.cleanup.enabled);
        assert_eq!(config.cleanup.max_age_days, 7);
        assert_eq!(config.cleanup.interval_hours, 24);
        assert_eq!(config.cleanup.stop_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[cleanup]
max_age_days = 14
            "#,
        )
        .unwrap();

        assert_eq!(config.cleanup.max_age_days, 14);
        assert_eq!(config.cleanup.interval_hours, 24);
        assert!(config.cleanup.enabled);
    }
}
