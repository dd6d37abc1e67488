//! Subsystem death handling and recovery.

use tracing::{debug, error};

use super::Coordinator;
use super::setup::Removal;
use crate::events::{DeathNotifier, ListenerId, RadioModeNotifier};
use crate::metrics::Counter;
use crate::role::InterfaceRole;
use crate::subsystem::SubsystemKind;

impl Coordinator {
    pub(super) fn handle_subsystem_death(&mut self, kind: SubsystemKind) {
        if kind.is_daemon() && !self.daemons.is_running(kind) {
            debug!(
                target: "wlan_lifecycle::coordinator",
                subsystem = %kind,
                "ignoring death of a daemon that is not running"
            );
            return;
        }
        self.health.set(kind, false);
        self.clients.metrics.increment(Counter::SubsystemCrash(kind));
        self.reporter.subsystem_died(kind);
        self.notify_status(false);
        if kind.is_daemon() {
            self.daemons.set(kind, false);
        }

        for (listener, name, role) in self.registry.dependents_of(kind) {
            self.destroy_after_death(kind, listener, &name, role);
        }

        let recovered = match kind {
            SubsystemKind::ResourceLayer => self.recover_resource_layer(),
            SubsystemKind::KernelControl => self.initialize_kernel(),
            // Daemons restart lazily on the next setup that needs them.
            SubsystemKind::StationDaemon | SubsystemKind::AccessPointDaemon => true,
        };
        if !recovered {
            error!(
                target: "wlan_lifecycle::coordinator",
                subsystem = %kind,
                "subsystem recovery failed"
            );
            return;
        }
        if !kind.is_daemon() {
            self.health.set(kind, true);
            self.reporter.subsystem_recovered(kind);
        }
        self.notify_status(self.is_ready());
    }

    /// Destroys one dependent interface through the ordinary destruction
    /// path so its caller still receives `on_destroyed`.
    fn destroy_after_death(
        &mut self,
        kind: SubsystemKind,
        listener: ListenerId,
        name: &str,
        role: InterfaceRole,
    ) {
        // A live resource layer still holds the radio allocation.
        if kind != SubsystemKind::ResourceLayer
            && self.request_removal(role, name) == Removal::Requested
        {
            self.process_destructions();
        }
        if self.registry.teardown_view(listener, name).is_some() {
            self.handle_destruction(listener, name);
        }
    }

    fn recover_resource_layer(&mut self) -> bool {
        let death = DeathNotifier::new(SubsystemKind::ResourceLayer, self.queue.poster());
        if !self.clients.resource.initialize(death) {
            return false;
        }
        self.clients
            .resource
            .register_radio_mode_handler(RadioModeNotifier::new(self.queue.poster()));
        true
    }
}
