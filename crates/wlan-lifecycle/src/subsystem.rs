//! Identities and health flags for the cooperating subsystems.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Subsystems whose availability gates interface lifecycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsystemKind {
    /// Vendor layer owning radio resources and interface name allocation.
    ResourceLayer,
    /// Kernel netlink control layer.
    KernelControl,
    /// Station protocol daemon.
    StationDaemon,
    /// Access-point protocol daemon.
    AccessPointDaemon,
}

impl SubsystemKind {
    /// Every subsystem, in bring-up order.
    pub const ALL: [Self; 4] = [
        Self::ResourceLayer,
        Self::KernelControl,
        Self::StationDaemon,
        Self::AccessPointDaemon,
    ];

    /// Returns the identifier used in logs and metric names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResourceLayer => "resource_layer",
            Self::KernelControl => "kernel_control",
            Self::StationDaemon => "station_daemon",
            Self::AccessPointDaemon => "access_point_daemon",
        }
    }

    /// Returns `true` for the two protocol daemons.
    #[must_use]
    pub const fn is_daemon(self) -> bool {
        matches!(self, Self::StationDaemon | Self::AccessPointDaemon)
    }
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors raised when parsing subsystem identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown subsystem '{0}'")]
pub struct SubsystemKindParseError(String);

impl SubsystemKindParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub const fn input(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for SubsystemKind {
    type Err = SubsystemKindParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "resource_layer" | "vendor" => Ok(Self::ResourceLayer),
            "kernel_control" | "kernel" => Ok(Self::KernelControl),
            "station_daemon" => Ok(Self::StationDaemon),
            "access_point_daemon" => Ok(Self::AccessPointDaemon),
            other => Err(SubsystemKindParseError(other.to_owned())),
        }
    }
}

/// Per-subsystem availability flags.
///
/// A flag drops to `false` when the subsystem's death is reported and is
/// raised again by the next successful (re)initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemHealth {
    resource_layer: bool,
    kernel_control: bool,
    station_daemon: bool,
    access_point_daemon: bool,
}

impl Default for SubsystemHealth {
    fn default() -> Self {
        Self {
            resource_layer: true,
            kernel_control: true,
            station_daemon: true,
            access_point_daemon: true,
        }
    }
}

impl SubsystemHealth {
    /// Returns the flag for `kind`.
    #[must_use]
    pub const fn is_up(&self, kind: SubsystemKind) -> bool {
        match kind {
            SubsystemKind::ResourceLayer => self.resource_layer,
            SubsystemKind::KernelControl => self.kernel_control,
            SubsystemKind::StationDaemon => self.station_daemon,
            SubsystemKind::AccessPointDaemon => self.access_point_daemon,
        }
    }

    pub(crate) const fn set(&mut self, kind: SubsystemKind, up: bool) {
        match kind {
            SubsystemKind::ResourceLayer => self.resource_layer = up,
            SubsystemKind::KernelControl => self.kernel_control = up,
            SubsystemKind::StationDaemon => self.station_daemon = up,
            SubsystemKind::AccessPointDaemon => self.access_point_daemon = up,
        }
    }
}
