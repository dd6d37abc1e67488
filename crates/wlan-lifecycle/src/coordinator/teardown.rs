//! Caller-initiated teardown and the shared destruction handler.

use tracing::{debug, warn};

use super::Coordinator;
use super::setup::Removal;
use crate::events::ListenerId;
use crate::registry::TeardownView;
use crate::subsystem::SubsystemKind;

impl Coordinator {
    /// Asks the resource layer to release `name`.
    ///
    /// Unknown names are ignored without touching any subsystem. Cleanup
    /// runs when the destruction listener reports back, on the same path as
    /// subsystem-initiated destruction.
    pub fn teardown_interface(&mut self, name: &str) {
        let Some(entry) = self.registry.get(name) else {
            debug!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "teardown requested for unknown interface"
            );
            return;
        };
        let (role, listener) = (entry.role, entry.listener);
        match self.request_removal(role, name) {
            Removal::Requested => self.process_destructions(),
            Removal::Unsupported => self.handle_destruction(listener, name),
            Removal::Refused => warn!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                role = %role,
                "resource layer refused to remove interface"
            ),
        }
    }

    /// Tears down every published interface.
    pub fn teardown_all_interfaces(&mut self) {
        for name in self.registry.all_names() {
            self.teardown_interface(&name);
        }
    }

    /// Runs the fixed teardown order for the interface `listener` was
    /// registered for. Stale and repeated events are ignored.
    pub(super) fn handle_destruction(&mut self, listener: ListenerId, name: &str) {
        let Some(TeardownView {
            role,
            observer,
            published,
        }) = self.registry.teardown_view(listener, name)
        else {
            debug!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "ignoring destruction event for untracked interface"
            );
            return;
        };

        if role.is_station() {
            self.clients.monitor.stop_monitoring(name);
        }
        if let Some(id) = observer {
            self.clients.link.unregister_observer(id);
        }
        if let Some(daemon) = role.daemon() {
            if !self.daemon_mut(daemon).teardown_iface(name) {
                debug!(
                    target: "wlan_lifecycle::coordinator",
                    interface = name,
                    daemon = %daemon,
                    "daemon did not release interface"
                );
            }
        }
        let kernel_released = if role.is_station() {
            self.clients.kernel.tear_down_client_interface(name)
        } else {
            self.clients.kernel.tear_down_soft_ap_interface(name)
        };
        if !kernel_released {
            debug!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "kernel control did not release interface"
            );
        }
        let last_of_family = role
            .daemon()
            .filter(|daemon| !self.registry.daemon_in_use(*daemon, Some(listener)));
        if let Some(daemon) = last_of_family {
            self.stop_daemon(daemon);
        }
        if !self.registry.any_live(Some(listener)) {
            self.tear_down_global();
        }

        let Some(removed) = self.registry.remove(listener, name, published) else {
            return;
        };
        self.reporter.interface_destroyed(name, removed.role);
        removed.callback.on_destroyed(name);
    }

    pub(super) fn stop_daemon(&mut self, daemon: SubsystemKind) {
        let client = self.daemon_mut(daemon);
        if !client.deregister_death_handler() {
            debug!(
                target: "wlan_lifecycle::coordinator",
                daemon = %daemon,
                "daemon death handler was not registered"
            );
        }
        client.terminate();
        self.daemons.set(daemon, false);
    }

    fn tear_down_global(&mut self) {
        if !self.clients.kernel.tear_down_interfaces() {
            warn!(
                target: "wlan_lifecycle::coordinator",
                "kernel control failed to tear down global state"
            );
        }
        if self.clients.resource.is_supported() {
            self.clients.resource.stop();
        }
    }
}
