//! Internal setup failures.
//!
//! These never cross the public boundary; the coordinator turns them into a
//! `None` result, a failure counter and a structured log record.

use thiserror::Error;

use crate::metrics::FailureCause;
use crate::subsystem::SubsystemKind;

/// Reasons an interface setup sequence stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The resource layer could not be started.
    #[error("resource layer failed to start")]
    ResourceLayerStart,
    /// A protocol daemon could not be started.
    #[error("{daemon} failed to start")]
    DaemonStart {
        /// Daemon that failed.
        daemon: SubsystemKind,
    },
    /// The resource layer did not allocate an interface.
    #[error("resource layer did not allocate an interface")]
    InterfaceCreation,
    /// The resource layer handed out a name that is already registered.
    #[error("interface {name} is already registered")]
    NameCollision {
        /// Colliding name.
        name: String,
    },
    /// The kernel control layer rejected the binding.
    #[error("kernel control rejected interface {name}")]
    KernelBinding {
        /// Interface being bound.
        name: String,
    },
    /// A daemon refused to adopt the interface.
    #[error("{daemon} rejected interface {name}")]
    DaemonBinding {
        /// Daemon that refused.
        daemon: SubsystemKind,
        /// Interface being adopted.
        name: String,
    },
    /// Bridged instance names could not be resolved.
    #[error("bridged instances unavailable for {name}")]
    BridgedInstances {
        /// Bridged access-point interface.
        name: String,
    },
    /// The interface was destroyed before setup finished.
    #[error("interface {name} was destroyed during setup")]
    DestroyedDuringSetup {
        /// Interface that vanished.
        name: String,
    },
}

impl SetupError {
    pub(crate) fn kernel_binding(name: &str) -> Self {
        Self::KernelBinding {
            name: name.to_owned(),
        }
    }

    pub(crate) fn daemon_binding(daemon: SubsystemKind, name: &str) -> Self {
        Self::DaemonBinding {
            daemon,
            name: name.to_owned(),
        }
    }

    pub(crate) fn bridged_instances(name: &str) -> Self {
        Self::BridgedInstances {
            name: name.to_owned(),
        }
    }

    pub(crate) fn destroyed_during_setup(name: &str) -> Self {
        Self::DestroyedDuringSetup {
            name: name.to_owned(),
        }
    }

    /// Returns the subsystem the failure counter blames, if any.
    #[must_use]
    pub const fn cause(&self) -> Option<FailureCause> {
        match self {
            Self::ResourceLayerStart
            | Self::InterfaceCreation
            | Self::NameCollision { .. }
            | Self::BridgedInstances { .. } => Some(FailureCause::ResourceLayer),
            Self::KernelBinding { .. } => Some(FailureCause::KernelControl),
            Self::DaemonStart { .. } | Self::DaemonBinding { .. } => Some(FailureCause::Daemon),
            Self::DestroyedDuringSetup { .. } => None,
        }
    }
}
