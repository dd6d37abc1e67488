//! Interface setup sequences.

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::Coordinator;
use crate::clients::{DaemonClient, InterfaceCallback};
use crate::errors::SetupError;
use crate::events::{
    CountryCodeNotifier, DeathNotifier, DestructionListener, LinkObserver, ListenerId,
    ScanEventNotifier,
};
use crate::metrics::Counter;
use crate::registry::{CapabilityFacts, StagedInterface};
use crate::role::{AccessPointRequest, Band, InterfaceRole, WorkSource};
use crate::subsystem::SubsystemKind;

/// How a resource-layer removal request went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Removal {
    /// The layer accepted the request; its listener reports completion.
    Requested,
    /// The layer refused the request.
    Refused,
    /// There is no resource layer on this device.
    Unsupported,
}

impl Coordinator {
    /// Creates a station interface bound to the station daemon.
    pub fn setup_client_for_connectivity(
        &mut self,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
    ) -> Option<String> {
        self.setup(InterfaceRole::StationConnectivity, callback, work_source, None)
    }

    /// Creates a scan-only station interface.
    pub fn setup_client_for_scan(
        &mut self,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
    ) -> Option<String> {
        self.setup(InterfaceRole::StationScan, callback, work_source, None)
    }

    /// Creates an access-point interface.
    pub fn setup_soft_ap(
        &mut self,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
        request: AccessPointRequest,
    ) -> Option<String> {
        self.setup(request.role(), callback, work_source, Some(&request))
    }

    fn setup(
        &mut self,
        role: InterfaceRole,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
        request: Option<&AccessPointRequest>,
    ) -> Option<String> {
        match self.try_setup(role, callback, work_source, request) {
            Ok(name) => Some(name),
            Err(error) => {
                if let Some(cause) = error.cause() {
                    self.clients.metrics.increment(Counter::SetupFailure {
                        family: role.family(),
                        cause,
                    });
                }
                self.reporter.setup_failed(role, &error);
                None
            }
        }
    }

    fn try_setup(
        &mut self,
        role: InterfaceRole,
        callback: Box<dyn InterfaceCallback>,
        work_source: &WorkSource,
        request: Option<&AccessPointRequest>,
    ) -> Result<String, SetupError> {
        if !self.clients.resource.is_supported() {
            self.evict_for_single_interface();
        }
        self.bring_up_global()?;
        if let Some(daemon) = role.daemon() {
            self.ensure_daemon(daemon)?;
        }

        let listener = self.tokens.listener();
        self.registry
            .stage(StagedInterface::new(listener, role, callback));
        let name = self.create_interface(role, listener, work_source, request)?;
        self.process_destructions();
        if !self.registry.is_staged(listener) {
            return Err(SetupError::destroyed_during_setup(&name));
        }
        self.supersede_previous_holder(&name);
        if let Some(staged) = self.registry.staged_mut(listener) {
            staged.name = Some(name.clone());
        }

        self.bind_interface(role, listener, &name)?;
        self.observe_interface(role, listener, &name);
        if role.is_station() {
            self.prepare_station_network(role, &name);
        }
        let capabilities = self.query_capabilities(role, &name);
        let bridged_instances = if role.is_bridged() {
            match self.clients.resource.bridged_ap_instances(&name) {
                Some(instances) => instances,
                None => {
                    self.roll_back(role, listener, &name);
                    return Err(SetupError::bridged_instances(&name));
                }
            }
        } else {
            Vec::new()
        };
        if let Some(staged) = self.registry.staged_mut(listener) {
            staged.capabilities = capabilities;
            staged.bridged_instances = bridged_instances;
        }

        self.publish(listener, &name)?;
        Ok(name)
    }

    /// Retires a published entry whose name the resource layer handed out
    /// again before that entry's destruction event arrived. Its late event
    /// no longer matches and is dropped.
    fn supersede_previous_holder(&mut self, name: &str) {
        let Some(previous) = self.registry.get(name).map(|entry| entry.listener) else {
            return;
        };
        debug!(
            target: "wlan_lifecycle::coordinator",
            interface = name,
            "resource layer reused a name awaiting destruction"
        );
        self.handle_destruction(previous, name);
    }

    /// Without a resource layer the device hosts one interface at a time,
    /// so a new request displaces whatever exists.
    fn evict_for_single_interface(&mut self) {
        for name in self.registry.all_names() {
            debug!(
                target: "wlan_lifecycle::coordinator",
                interface = %name,
                "evicting interface for new request"
            );
            self.teardown_interface(&name);
        }
    }

    fn bring_up_global(&mut self) -> Result<(), SetupError> {
        if self.registry.any_live(None) {
            return Ok(());
        }
        if self.clients.resource.is_supported() {
            self.reporter.subsystem_starting(SubsystemKind::ResourceLayer);
            if !self.clients.resource.start() {
                self.reporter.subsystem_failed(SubsystemKind::ResourceLayer);
                return Err(SetupError::ResourceLayerStart);
            }
            self.health.set(SubsystemKind::ResourceLayer, true);
            self.reporter.subsystem_ready(SubsystemKind::ResourceLayer);
            if !self
                .clients
                .resource
                .set_coex_unsafe_channels(&self.coex.channels, self.coex.restrictions)
            {
                debug!(
                    target: "wlan_lifecycle::coordinator",
                    "resource layer rejected cached coexistence channels"
                );
            }
        }
        let notifier = CountryCodeNotifier::new(self.queue.poster());
        if !self.clients.kernel.register_country_code_listener(notifier) {
            debug!(
                target: "wlan_lifecycle::coordinator",
                "kernel control declined country code subscription"
            );
        }
        Ok(())
    }

    /// Starts `daemon` unless it is already running. A daemon left running
    /// by an earlier failed setup is reused.
    pub(super) fn ensure_daemon(&mut self, daemon: SubsystemKind) -> Result<(), SetupError> {
        if self.daemons.is_running(daemon) {
            return Ok(());
        }
        self.reporter.subsystem_starting(daemon);
        let death = DeathNotifier::new(daemon, self.queue.poster());
        let attempts = self.settings.daemon_ready_attempts;
        let interval = self.settings.daemon_ready_poll_interval;
        let started = start_daemon(self.daemon_mut(daemon), death, attempts, interval);
        if !started {
            self.reporter.subsystem_failed(daemon);
            return Err(SetupError::DaemonStart { daemon });
        }
        self.daemons.set(daemon, true);
        self.health.set(daemon, true);
        self.reporter.subsystem_ready(daemon);
        Ok(())
    }

    fn create_interface(
        &mut self,
        role: InterfaceRole,
        listener: ListenerId,
        work_source: &WorkSource,
        request: Option<&AccessPointRequest>,
    ) -> Result<String, SetupError> {
        if !self.clients.resource.is_supported() {
            return Ok(self.settings.fallback_interface_name.clone());
        }
        let handle = DestructionListener::new(listener, self.queue.poster());
        let created = match request {
            Some(ap) => self
                .clients
                .resource
                .create_access_point_iface(handle, work_source, ap),
            None => self
                .clients
                .resource
                .create_station_iface(handle, work_source),
        };
        created.ok_or_else(|| {
            self.registry.unstage(listener);
            debug!(
                target: "wlan_lifecycle::coordinator",
                role = %role,
                "resource layer returned no interface"
            );
            SetupError::InterfaceCreation
        })
    }

    fn bind_interface(
        &mut self,
        role: InterfaceRole,
        listener: ListenerId,
        name: &str,
    ) -> Result<(), SetupError> {
        let bound = if role.is_station() {
            let scan_events = ScanEventNotifier::new(name, self.queue.poster());
            self.clients.kernel.setup_client_interface(name, scan_events)
        } else {
            self.clients.kernel.setup_soft_ap_interface(name)
        };
        if !bound {
            self.roll_back(role, listener, name);
            return Err(SetupError::kernel_binding(name));
        }
        if role == InterfaceRole::StationConnectivity
            && !self.clients.station_daemon.setup_iface(name)
        {
            self.roll_back(role, listener, name);
            return Err(SetupError::daemon_binding(SubsystemKind::StationDaemon, name));
        }
        Ok(())
    }

    fn observe_interface(&mut self, role: InterfaceRole, listener: ListenerId, name: &str) {
        let observer = self.tokens.observer();
        self.clients
            .link
            .register_observer(LinkObserver::new(observer, name, self.queue.poster()));
        if role.is_station() {
            self.clients.monitor.start_monitoring(name);
        }
        let up = self.clients.link.is_interface_up(name);
        if let Some(staged) = self.registry.staged_mut(listener) {
            staged.observer = Some(observer);
            if up {
                staged.up = true;
                staged.callback.on_up(name);
            }
        }
    }

    fn prepare_station_network(&mut self, role: InterfaceRole, name: &str) {
        if self.clients.resource.is_supported() {
            self.clients.resource.enable_link_layer_stats(name);
        }
        if role == InterfaceRole::StationConnectivity {
            self.apply_qos_policy(name);
            let link = &mut self.clients.link;
            link.clear_interface_addresses(name);
            link.set_ipv6_privacy_extensions(name, true);
            link.disable_ipv6(name);
        }
    }

    pub(super) fn apply_qos_policy(&mut self, name: &str) {
        if !self.settings.network_centric_qos_policy {
            return;
        }
        if !self
            .clients
            .station_daemon
            .set_network_centric_qos_policy(name, true)
        {
            warn!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "station daemon refused network-centric QoS policy"
            );
        }
    }

    /// Queries capability facts; repeated after a mode switch because the
    /// station daemon's presence changes what can be asked.
    pub(super) fn query_capabilities(
        &mut self,
        role: InterfaceRole,
        name: &str,
    ) -> CapabilityFacts {
        let with_station_daemon = role == InterfaceRole::StationConnectivity;
        let advanced = if with_station_daemon {
            self.clients.station_daemon.advanced_capabilities(name)
        } else {
            0
        };
        let vendor = self.clients.resource.is_supported();
        let vendor_features = if vendor {
            self.clients.resource.supported_feature_set(name)
        } else {
            0
        };
        let feature_set = vendor_features | advanced;
        let driver_features = if with_station_daemon {
            self.clients.station_daemon.driver_feature_set(name)
        } else {
            0
        };
        let usable_channels = if vendor {
            self.clients.resource.usable_channels(name)
        } else {
            None
        };
        let supported_bands = usable_channels.map_or_else(
            || {
                Band::ALL
                    .into_iter()
                    .filter(|band| !self.clients.kernel.channels_for_band(*band).is_empty())
                    .collect::<BTreeSet<_>>()
            },
            |channels| {
                channels
                    .iter()
                    .filter_map(|channel| Band::from_frequency(channel.frequency_mhz))
                    .collect()
            },
        );
        self.last_feature_set = feature_set;
        CapabilityFacts {
            feature_set,
            driver_features,
            supported_bands,
        }
    }

    fn publish(&mut self, listener: ListenerId, name: &str) -> Result<(), SetupError> {
        let Some(role) = self.registry.staged_mut(listener).map(|staged| staged.role) else {
            return Err(SetupError::destroyed_during_setup(name));
        };
        if self.registry.contains(name) {
            error!(
                target: "wlan_lifecycle::coordinator",
                interface = name,
                "interface name registered while setup was running"
            );
            self.roll_back(role, listener, name);
            return Err(SetupError::NameCollision {
                name: name.to_owned(),
            });
        }
        let Some(staged) = self.registry.unstage(listener) else {
            return Err(SetupError::destroyed_during_setup(name));
        };
        let interface = match staged.into_interface() {
            Ok(interface) => interface,
            Err(incomplete) => {
                self.registry.stage(incomplete);
                self.roll_back(role, listener, name);
                return Err(SetupError::destroyed_during_setup(name));
            }
        };
        if let Err(rejected) = self.registry.publish(interface) {
            self.registry.stage(rejected.into_staged());
            self.roll_back(role, listener, name);
            return Err(SetupError::NameCollision {
                name: name.to_owned(),
            });
        }
        info!(
            target: "wlan_lifecycle::coordinator",
            interface = name,
            role = %role,
            "interface setup complete"
        );
        self.reporter.interface_published(name, role);
        Ok(())
    }

    /// Undoes a partially set up interface by releasing its resource-layer
    /// allocation; the ordinary destruction path does the rest.
    pub(super) fn roll_back(&mut self, role: InterfaceRole, listener: ListenerId, name: &str) {
        debug!(
            target: "wlan_lifecycle::coordinator",
            interface = name,
            role = %role,
            "rolling back interface setup"
        );
        match self.request_removal(role, name) {
            // The entry stays staged until the listener reports, which may
            // happen after this call returns.
            Removal::Requested => self.process_destructions(),
            Removal::Refused | Removal::Unsupported => {
                if self.registry.is_staged(listener) {
                    self.handle_destruction(listener, name);
                }
            }
        }
    }

    pub(super) fn request_removal(&mut self, role: InterfaceRole, name: &str) -> Removal {
        if !self.clients.resource.is_supported() {
            return Removal::Unsupported;
        }
        let accepted = if role.is_station() {
            self.clients.resource.remove_station_iface(name)
        } else {
            self.clients.resource.remove_access_point_iface(name)
        };
        if accepted {
            Removal::Requested
        } else {
            Removal::Refused
        }
    }
}

fn start_daemon(
    daemon: &mut dyn DaemonClient,
    death: DeathNotifier,
    attempts: u32,
    interval: Duration,
) -> bool {
    if !daemon.is_initialization_started() && !daemon.initialize() {
        return false;
    }
    if !daemon.start_daemon() {
        return false;
    }
    if !wait_until_ready(daemon, attempts, interval) {
        return false;
    }
    daemon.register_death_handler(death)
}

fn wait_until_ready(daemon: &dyn DaemonClient, attempts: u32, interval: Duration) -> bool {
    for attempt in 1..=attempts {
        if daemon.is_initialization_complete() {
            return true;
        }
        if attempt < attempts {
            thread::sleep(interval);
        }
    }
    false
}
