//! Structured reporting for subsystem and interface lifecycle milestones.

use std::sync::Arc;

use crate::errors::SetupError;
use crate::role::InterfaceRole;
use crate::subsystem::SubsystemKind;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before a subsystem is started.
    fn subsystem_starting(&self, kind: SubsystemKind);

    /// Invoked after a subsystem starts successfully.
    fn subsystem_ready(&self, kind: SubsystemKind);

    /// Invoked when a subsystem fails to start.
    fn subsystem_failed(&self, kind: SubsystemKind);

    /// Invoked when a subsystem death is handled.
    fn subsystem_died(&self, kind: SubsystemKind);

    /// Invoked after a dead subsystem is brought back.
    fn subsystem_recovered(&self, kind: SubsystemKind);

    /// Invoked when an interface becomes visible to queries.
    fn interface_published(&self, name: &str, role: InterfaceRole);

    /// Invoked once an interface's teardown has finished.
    fn interface_destroyed(&self, name: &str, role: InterfaceRole);

    /// Invoked when a setup call fails.
    fn setup_failed(&self, role: InterfaceRole, error: &SetupError);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn subsystem_starting(&self, kind: SubsystemKind) {
        (**self).subsystem_starting(kind);
    }

    fn subsystem_ready(&self, kind: SubsystemKind) {
        (**self).subsystem_ready(kind);
    }

    fn subsystem_failed(&self, kind: SubsystemKind) {
        (**self).subsystem_failed(kind);
    }

    fn subsystem_died(&self, kind: SubsystemKind) {
        (**self).subsystem_died(kind);
    }

    fn subsystem_recovered(&self, kind: SubsystemKind) {
        (**self).subsystem_recovered(kind);
    }

    fn interface_published(&self, name: &str, role: InterfaceRole) {
        (**self).interface_published(name, role);
    }

    fn interface_destroyed(&self, name: &str, role: InterfaceRole) {
        (**self).interface_destroyed(name, role);
    }

    fn setup_failed(&self, role: InterfaceRole, error: &SetupError) {
        (**self).setup_failed(role, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn subsystem_starting(&self, kind: SubsystemKind) {
        tracing::info!(
            target: "wlan_lifecycle::health",
            event = "subsystem_starting",
            subsystem = %kind,
            "starting subsystem"
        );
    }

    fn subsystem_ready(&self, kind: SubsystemKind) {
        tracing::info!(
            target: "wlan_lifecycle::health",
            event = "subsystem_ready",
            subsystem = %kind,
            "subsystem ready"
        );
    }

    fn subsystem_failed(&self, kind: SubsystemKind) {
        tracing::error!(
            target: "wlan_lifecycle::health",
            event = "subsystem_failed",
            subsystem = %kind,
            "subsystem failed to start"
        );
    }

    fn subsystem_died(&self, kind: SubsystemKind) {
        tracing::warn!(
            target: "wlan_lifecycle::health",
            event = "subsystem_died",
            subsystem = %kind,
            "subsystem died"
        );
    }

    fn subsystem_recovered(&self, kind: SubsystemKind) {
        tracing::info!(
            target: "wlan_lifecycle::health",
            event = "subsystem_recovered",
            subsystem = %kind,
            "subsystem recovered"
        );
    }

    fn interface_published(&self, name: &str, role: InterfaceRole) {
        tracing::info!(
            target: "wlan_lifecycle::health",
            event = "interface_published",
            interface = name,
            role = %role,
            "interface ready"
        );
    }

    fn interface_destroyed(&self, name: &str, role: InterfaceRole) {
        tracing::info!(
            target: "wlan_lifecycle::health",
            event = "interface_destroyed",
            interface = name,
            role = %role,
            "interface destroyed"
        );
    }

    fn setup_failed(&self, role: InterfaceRole, error: &SetupError) {
        tracing::error!(
            target: "wlan_lifecycle::health",
            event = "setup_failed",
            role = %role,
            cause = ?error.cause(),
            error = %error,
            "interface setup failed"
        );
    }
}
