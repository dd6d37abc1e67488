//! Wireless interface lifecycle coordination.
//!
//! The crate creates, tears down and mode-switches station and access-point
//! interfaces that are multiplexed across a vendor resource layer, a kernel
//! control layer and two protocol daemons. Each external subsystem sits
//! behind a narrow trait in [`clients`] so hosts and tests can supply their
//! own implementations. Asynchronous signals from those subsystems are
//! queued as [`Event`]s and processed serially by the [`Coordinator`].

#![deny(missing_docs)]

pub mod clients;
mod coordinator;
mod errors;
mod events;
mod metrics;
mod registry;
mod reporter;
mod role;
mod subsystem;

pub use coordinator::{Coordinator, Subsystems};
pub use errors::SetupError;
pub use events::{
    CountryCodeNotifier, DeathNotifier, DestructionListener, Event, EventPoster, LinkObserver,
    ListenerId, ObserverId, RadioMode, RadioModeNotifier, ScanEvent, ScanEventNotifier, Waker,
};
pub use metrics::{Counter, FailureCause, MetricsSink};
pub use registry::CapabilityFacts;
pub use reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use role::{
    AccessPointRequest, ApManagerId, Band, IfaceKind, InterfaceRole, RoleFamily, WorkSource,
};
pub use subsystem::{SubsystemHealth, SubsystemKind, SubsystemKindParseError};

#[cfg(test)]
mod tests;
