use crate::logging::LogFormat;

/// Default log filter expression used by the service.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Interface name used when the resource layer cannot allocate names.
pub const DEFAULT_FALLBACK_INTERFACE_NAME: &str = "wlan0";

/// How many times a freshly started daemon is polled for readiness.
pub const DEFAULT_DAEMON_READY_ATTEMPTS: u32 = 50;

/// Delay between daemon readiness polls, in milliseconds.
pub const DEFAULT_DAEMON_READY_POLL_INTERVAL_MS: u64 = 100;

/// Stations leave the daemon's network-centric QoS policy off unless asked.
pub const DEFAULT_NETWORK_CENTRIC_QOS_POLICY: bool = false;

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the service.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned fallback interface name for serde defaults.
pub fn default_fallback_interface_name() -> String {
    DEFAULT_FALLBACK_INTERFACE_NAME.to_owned()
}

/// Default daemon readiness attempt count for serde.
pub const fn default_daemon_ready_attempts() -> u32 {
    DEFAULT_DAEMON_READY_ATTEMPTS
}

/// Default daemon readiness poll interval for serde.
pub const fn default_daemon_ready_poll_interval_ms() -> u64 {
    DEFAULT_DAEMON_READY_POLL_INTERVAL_MS
}

/// Default network-centric QoS policy switch for serde.
pub const fn default_network_centric_qos_policy() -> bool {
    DEFAULT_NETWORK_CENTRIC_QOS_POLICY
}
