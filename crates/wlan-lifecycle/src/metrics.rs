//! Counters reported to the metrics sink.

use std::sync::Arc;

use crate::events::RadioMode;
use crate::role::RoleFamily;
use crate::subsystem::SubsystemKind;

/// Subsystem blamed for a failed setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCause {
    /// The resource layer failed to start or allocate.
    ResourceLayer,
    /// The kernel control layer rejected the binding.
    KernelControl,
    /// A protocol daemon failed to start or adopt the interface.
    Daemon,
}

/// Counters the coordinator increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// A setup call returned failure.
    SetupFailure {
        /// Family of the requested interface.
        family: RoleFamily,
        /// Subsystem blamed for the failure.
        cause: FailureCause,
    },
    /// A subsystem death was reported.
    SubsystemCrash(SubsystemKind),
    /// A published interface went down.
    InterfaceDown(RoleFamily),
    /// The radio switched concurrency mode.
    RadioModeChange(RadioMode),
    /// A PNO scan found a network.
    PnoNetworkFound,
    /// A PNO scan failed.
    PnoScanFailed,
}

impl Counter {
    /// Returns the stable dotted metric name.
    #[must_use]
    pub const fn metric_name(self) -> &'static str {
        match self {
            Self::SetupFailure { family, cause } => setup_failure_name(family, cause),
            Self::SubsystemCrash(kind) => match kind {
                SubsystemKind::ResourceLayer => "wlan.crash.resource_layer",
                SubsystemKind::KernelControl => "wlan.crash.kernel_control",
                SubsystemKind::StationDaemon => "wlan.crash.station_daemon",
                SubsystemKind::AccessPointDaemon => "wlan.crash.access_point_daemon",
            },
            Self::InterfaceDown(RoleFamily::Station) => "wlan.interface_down.station",
            Self::InterfaceDown(RoleFamily::AccessPoint) => "wlan.interface_down.access_point",
            Self::RadioModeChange(mode) => match mode {
                RadioMode::Mcc => "wlan.radio_mode.mcc",
                RadioMode::Scc => "wlan.radio_mode.scc",
                RadioMode::Sbs => "wlan.radio_mode.sbs",
                RadioMode::Dbs => "wlan.radio_mode.dbs",
            },
            Self::PnoNetworkFound => "wlan.pno.network_found",
            Self::PnoScanFailed => "wlan.pno.scan_failed",
        }
    }
}

const fn setup_failure_name(family: RoleFamily, cause: FailureCause) -> &'static str {
    match (family, cause) {
        (RoleFamily::Station, FailureCause::ResourceLayer) => {
            "wlan.setup.station.failure.resource_layer"
        }
        (RoleFamily::Station, FailureCause::KernelControl) => {
            "wlan.setup.station.failure.kernel_control"
        }
        (RoleFamily::Station, FailureCause::Daemon) => "wlan.setup.station.failure.daemon",
        (RoleFamily::AccessPoint, FailureCause::ResourceLayer) => {
            "wlan.setup.access_point.failure.resource_layer"
        }
        (RoleFamily::AccessPoint, FailureCause::KernelControl) => {
            "wlan.setup.access_point.failure.kernel_control"
        }
        (RoleFamily::AccessPoint, FailureCause::Daemon) => {
            "wlan.setup.access_point.failure.daemon"
        }
    }
}

/// Destination for counter increments.
pub trait MetricsSink: Send {
    /// Adds one to `counter`.
    fn increment(&self, counter: Counter);
}

impl<T> MetricsSink for Arc<T>
where
    T: MetricsSink + Sync,
{
    fn increment(&self, counter: Counter) {
        (**self).increment(counter);
    }
}
