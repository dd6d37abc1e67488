//! Interface roles and the request parameters that accompany them.

use std::fmt;

use crate::subsystem::SubsystemKind;

/// Role an interface plays on the radio.
///
/// Everything role-specific the coordinator does is a pure function of
/// this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceRole {
    /// Station bound to the station daemon for association.
    StationConnectivity,
    /// Station used only for scanning; no daemon binding.
    StationScan,
    /// Single-instance access point.
    AccessPoint,
    /// Access point backed by two radio instances.
    AccessPointBridged,
}

impl InterfaceRole {
    /// Returns the identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StationConnectivity => "station_connectivity",
            Self::StationScan => "station_scan",
            Self::AccessPoint => "access_point",
            Self::AccessPointBridged => "access_point_bridged",
        }
    }

    /// Returns the family used for naming queries and metrics.
    #[must_use]
    pub const fn family(self) -> RoleFamily {
        match self {
            Self::StationConnectivity | Self::StationScan => RoleFamily::Station,
            Self::AccessPoint | Self::AccessPointBridged => RoleFamily::AccessPoint,
        }
    }

    /// Returns the protocol daemon that must adopt interfaces in this role.
    #[must_use]
    pub const fn daemon(self) -> Option<SubsystemKind> {
        match self {
            Self::StationConnectivity => Some(SubsystemKind::StationDaemon),
            Self::StationScan => None,
            Self::AccessPoint | Self::AccessPointBridged => Some(SubsystemKind::AccessPointDaemon),
        }
    }

    /// Returns `true` for both station roles.
    #[must_use]
    pub const fn is_station(self) -> bool {
        matches!(self.family(), RoleFamily::Station)
    }

    /// Returns `true` when bridged instance names must be resolved.
    #[must_use]
    pub const fn is_bridged(self) -> bool {
        matches!(self, Self::AccessPointBridged)
    }
}

impl fmt::Display for InterfaceRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Coarse grouping of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleFamily {
    /// Client interfaces.
    Station,
    /// Soft access-point interfaces.
    AccessPoint,
}

impl RoleFamily {
    /// Returns the identifier used in logs and metric names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::AccessPoint => "access_point",
        }
    }
}

impl fmt::Display for RoleFamily {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Radio frequency bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    /// 2.4 GHz.
    Ghz24,
    /// 5 GHz.
    Ghz5,
    /// 6 GHz.
    Ghz6,
    /// 60 GHz.
    Ghz60,
}

impl Band {
    /// Every band, lowest first.
    pub const ALL: [Self; 4] = [Self::Ghz24, Self::Ghz5, Self::Ghz6, Self::Ghz60];

    /// Maps a channel centre frequency to its band.
    #[must_use]
    pub const fn from_frequency(mhz: u32) -> Option<Self> {
        match mhz {
            2400..=2500 => Some(Self::Ghz24),
            4900..=5899 => Some(Self::Ghz5),
            5925..=7125 => Some(Self::Ghz6),
            58_320..=70_200 => Some(Self::Ghz60),
            _ => None,
        }
    }
}

/// Attribution token used by the resource layer for priority decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkSource {
    uids: Vec<u32>,
}

impl WorkSource {
    /// Builds a work source attributed to `uids`.
    pub fn new(uids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            uids: uids.into_iter().collect(),
        }
    }

    /// Returns the attributed uids.
    #[must_use]
    pub fn uids(&self) -> &[u32] {
        &self.uids
    }
}

/// Opaque handle identifying the soft-AP manager that owns a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApManagerId(
    /// Raw identifier assigned by the manager's owner.
    pub u64,
);

/// Parameters for an access-point setup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPointRequest {
    /// Preferred operating band.
    pub band: Band,
    /// Whether two radio instances should back the interface.
    pub bridged: bool,
    /// Manager the resource layer attributes the interface to.
    pub manager: ApManagerId,
}

impl AccessPointRequest {
    /// Returns the role this request resolves to.
    #[must_use]
    pub const fn role(&self) -> InterfaceRole {
        if self.bridged {
            InterfaceRole::AccessPointBridged
        } else {
            InterfaceRole::AccessPoint
        }
    }
}

/// Interface kinds the resource layer can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfaceKind {
    /// A station interface.
    Station,
    /// A single-instance access point.
    AccessPoint,
    /// A bridged access point.
    BridgedAccessPoint,
}
