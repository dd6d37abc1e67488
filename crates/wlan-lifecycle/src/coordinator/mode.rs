//! Station mode switching between connectivity and scan-only roles.

use tracing::{debug, warn};

use super::Coordinator;
use crate::errors::SetupError;
use crate::metrics::{Counter, FailureCause};
use crate::role::{InterfaceRole, RoleFamily, WorkSource};
use crate::subsystem::SubsystemKind;

impl Coordinator {
    /// Releases the station daemon binding of `name` so it only scans.
    ///
    /// Returns `true` without side effects if the interface already scans.
    pub fn switch_client_to_scan_mode(&mut self, name: &str, work_source: &WorkSource) -> bool {
        let Some(entry) = self.registry.get(name) else {
            warn!(target: "wlan_lifecycle::coordinator", interface = name, "unknown interface");
            return false;
        };
        let listener = entry.listener;
        match entry.role {
            InterfaceRole::StationScan => {
                debug!(
                    target: "wlan_lifecycle::coordinator",
                    interface = name,
                    "already in scan mode"
                );
                return true;
            }
            InterfaceRole::StationConnectivity => {}
            InterfaceRole::AccessPoint | InterfaceRole::AccessPointBridged => return false,
        }
        if !self.replace_station_requestor(name, work_source) {
            warn!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "failed to update requestor"
            );
            return false;
        }
        if !self.clients.station_daemon.teardown_iface(name) {
            warn!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "station daemon did not release interface; tearing it down"
            );
            self.teardown_interface(name);
            return false;
        }
        if !self
            .registry
            .daemon_in_use(SubsystemKind::StationDaemon, Some(listener))
        {
            self.stop_daemon(SubsystemKind::StationDaemon);
        }
        self.apply_role(name, InterfaceRole::StationScan);
        true
    }

    /// Brings the station daemon up if needed and binds `name` to it.
    ///
    /// Returns `true` without side effects if the interface already has
    /// connectivity.
    pub fn switch_client_to_connectivity_mode(
        &mut self,
        name: &str,
        work_source: &WorkSource,
    ) -> bool {
        let Some(entry) = self.registry.get(name) else {
            warn!(target: "wlan_lifecycle::coordinator", interface = name, "unknown interface");
            return false;
        };
        match entry.role {
            InterfaceRole::StationConnectivity => {
                debug!(
                    target: "wlan_lifecycle::coordinator",
                    interface = name,
                    "already in connectivity mode"
                );
                return true;
            }
            InterfaceRole::StationScan => {}
            InterfaceRole::AccessPoint | InterfaceRole::AccessPointBridged => return false,
        }
        if !self.replace_station_requestor(name, work_source) {
            warn!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "failed to update requestor"
            );
            return false;
        }
        if let Err(error) = self.ensure_daemon(SubsystemKind::StationDaemon) {
            self.abandon_switch(name, &error);
            return false;
        }
        if !self.clients.station_daemon.setup_iface(name) {
            let error = SetupError::daemon_binding(SubsystemKind::StationDaemon, name);
            self.abandon_switch(name, &error);
            return false;
        }
        self.apply_qos_policy(name);
        self.apply_role(name, InterfaceRole::StationConnectivity);
        true
    }

    /// A station that cannot reach connectivity mode is torn down rather
    /// than left half-bound.
    fn abandon_switch(&mut self, name: &str, error: &SetupError) {
        self.clients.metrics.increment(Counter::SetupFailure {
            family: RoleFamily::Station,
            cause: FailureCause::Daemon,
        });
        self.reporter
            .setup_failed(InterfaceRole::StationConnectivity, error);
        self.teardown_interface(name);
        let daemon = SubsystemKind::StationDaemon;
        if self.daemons.is_running(daemon) && !self.registry.daemon_in_use(daemon, None) {
            self.stop_daemon(daemon);
        }
    }

    fn apply_role(&mut self, name: &str, role: InterfaceRole) {
        if let Some(entry) = self.registry.get_mut(name) {
            entry.role = role;
        }
        let capabilities = self.query_capabilities(role, name);
        if let Some(entry) = self.registry.get_mut(name) {
            entry.capabilities = capabilities;
        }
    }
}
