//! Runtime configuration for the wireless interface lifecycle service.
//!
//! The configuration is deliberately small: it controls how the service
//! logs, which interface name to fall back to on devices without a vendor
//! resource layer, how patiently protocol daemons are waited on after
//! start-up, and whether stations opt into the daemon's QoS policy feature.
//! Values are read from TOML; every field has a default so an empty
//! document is a valid configuration.

mod defaults;
mod loader;
mod logging;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DAEMON_READY_ATTEMPTS, DEFAULT_DAEMON_READY_POLL_INTERVAL_MS,
    DEFAULT_FALLBACK_INTERFACE_NAME, DEFAULT_LOG_FILTER, DEFAULT_NETWORK_CENTRIC_QOS_POLICY,
};
pub use loader::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// `tracing` filter expression applied to the subscriber.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
    /// Interface name used when the resource layer is not supported.
    #[serde(default = "defaults::default_fallback_interface_name")]
    pub fallback_interface_name: String,
    /// Number of readiness polls after a daemon start request.
    #[serde(default = "defaults::default_daemon_ready_attempts")]
    pub daemon_ready_attempts: u32,
    /// Delay between readiness polls in milliseconds.
    #[serde(default = "defaults::default_daemon_ready_poll_interval_ms")]
    pub daemon_ready_poll_interval_ms: u64,
    /// Whether connectivity stations enable the station daemon's
    /// network-centric QoS policy feature.
    #[serde(default = "defaults::default_network_centric_qos_policy")]
    pub network_centric_qos_policy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            fallback_interface_name: defaults::default_fallback_interface_name(),
            daemon_ready_attempts: defaults::default_daemon_ready_attempts(),
            daemon_ready_poll_interval_ms: defaults::default_daemon_ready_poll_interval_ms(),
            network_centric_qos_policy: defaults::default_network_centric_qos_policy(),
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the interface name used without a vendor resource layer.
    #[must_use]
    pub fn fallback_interface_name(&self) -> &str {
        &self.fallback_interface_name
    }

    /// Returns how many readiness polls a daemon start may take.
    #[must_use]
    pub const fn daemon_ready_attempts(&self) -> u32 {
        self.daemon_ready_attempts
    }

    /// Returns the pause between readiness polls.
    #[must_use]
    pub const fn daemon_ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.daemon_ready_poll_interval_ms)
    }

    /// Returns whether the network-centric QoS policy is enabled on
    /// connectivity stations.
    #[must_use]
    pub const fn network_centric_qos_policy(&self) -> bool {
        self.network_centric_qos_policy
    }
}

#[cfg(test)]
mod tests;
