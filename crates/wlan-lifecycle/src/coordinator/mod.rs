//! The lifecycle coordinator.
//!
//! [`Coordinator`] owns the interface registry and one client per external
//! subsystem. Every method takes `&mut self`: the coordinator is meant to be
//! driven from a single serial context, and subsystem callbacks reach it
//! only as queued [`Event`]s drained by [`Coordinator::dispatch_pending`]
//! or at the safe points described on that method.

mod death;
mod link;
mod mode;
mod setup;
mod teardown;

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use tracing::{debug, warn};
use wlan_config::Config;

use crate::clients::{
    CoexUnsafeChannel, CountryCodeListener, DaemonClient, EventMonitor, KernelControl,
    LinkObserverRegistry, ResourceLayer, StationDaemon, StatusListener,
};
use crate::events::{DeathNotifier, Event, EventQueue, RadioModeNotifier, TokenMinter, Waker};
use crate::metrics::MetricsSink;
use crate::registry::InterfaceRegistry;
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};
use crate::role::{Band, IfaceKind, InterfaceRole, RoleFamily, WorkSource};
use crate::subsystem::{SubsystemHealth, SubsystemKind};

/// The external subsystem clients the coordinator drives.
pub struct Subsystems {
    /// Vendor resource layer.
    pub resource: Box<dyn ResourceLayer>,
    /// Kernel control layer.
    pub kernel: Box<dyn KernelControl>,
    /// Station protocol daemon.
    pub station_daemon: Box<dyn StationDaemon>,
    /// Access-point protocol daemon.
    pub ap_daemon: Box<dyn DaemonClient>,
    /// Link observer facility.
    pub link: Box<dyn LinkObserverRegistry>,
    /// Station event monitor.
    pub monitor: Box<dyn EventMonitor>,
    /// Metrics sink.
    pub metrics: Box<dyn MetricsSink>,
}

#[derive(Debug, Clone)]
struct Settings {
    fallback_interface_name: String,
    daemon_ready_attempts: u32,
    daemon_ready_poll_interval: Duration,
    network_centric_qos_policy: bool,
}

impl Settings {
    fn from_config(config: &Config) -> Self {
        Self {
            fallback_interface_name: config.fallback_interface_name().to_owned(),
            daemon_ready_attempts: config.daemon_ready_attempts(),
            daemon_ready_poll_interval: config.daemon_ready_poll_interval(),
            network_centric_qos_policy: config.network_centric_qos_policy(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CoexConstraint {
    channels: Vec<CoexUnsafeChannel>,
    restrictions: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct DaemonState {
    station_running: bool,
    access_point_running: bool,
}

impl DaemonState {
    const fn is_running(self, daemon: SubsystemKind) -> bool {
        match daemon {
            SubsystemKind::StationDaemon => self.station_running,
            SubsystemKind::AccessPointDaemon => self.access_point_running,
            SubsystemKind::ResourceLayer | SubsystemKind::KernelControl => false,
        }
    }

    const fn set(&mut self, daemon: SubsystemKind, running: bool) {
        match daemon {
            SubsystemKind::StationDaemon => self.station_running = running,
            SubsystemKind::AccessPointDaemon => self.access_point_running = running,
            SubsystemKind::ResourceLayer | SubsystemKind::KernelControl => {}
        }
    }
}

/// Creates, tears down and mode-switches wireless interfaces across the
/// cooperating subsystems.
pub struct Coordinator {
    clients: Subsystems,
    reporter: Box<dyn LifecycleReporter>,
    settings: Settings,
    registry: InterfaceRegistry,
    queue: EventQueue,
    deferred: VecDeque<Event>,
    tokens: TokenMinter,
    health: SubsystemHealth,
    daemons: DaemonState,
    status_listener: Option<Box<dyn StatusListener>>,
    country_code_listener: Option<Box<dyn CountryCodeListener>>,
    coex: CoexConstraint,
    last_feature_set: u64,
}

impl Coordinator {
    /// Builds a coordinator over `clients` using `config`.
    #[must_use]
    pub fn new(clients: Subsystems, config: &Config) -> Self {
        Self {
            clients,
            reporter: Box::new(StructuredLifecycleReporter::new()),
            settings: Settings::from_config(config),
            registry: InterfaceRegistry::default(),
            queue: EventQueue::new(),
            deferred: VecDeque::new(),
            tokens: TokenMinter::default(),
            health: SubsystemHealth::default(),
            daemons: DaemonState::default(),
            status_listener: None,
            country_code_listener: None,
            coex: CoexConstraint::default(),
            last_feature_set: 0,
        }
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn LifecycleReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Installs a callback invoked whenever a subsystem posts an event.
    ///
    /// Returns `false` when a waker is already installed.
    pub fn install_waker(&self, waker: Waker) -> bool {
        self.queue.install_waker(waker)
    }

    /// Registers death handlers, clears stale kernel state and subscribes to
    /// radio mode changes. Call once before any setup.
    pub fn initialize(&mut self) -> bool {
        let death = DeathNotifier::new(SubsystemKind::ResourceLayer, self.queue.poster());
        if !self.clients.resource.initialize(death) {
            warn!(target: "wlan_lifecycle::coordinator", "resource layer initialisation failed");
            return false;
        }
        if !self.initialize_kernel() {
            return false;
        }
        self.clients
            .resource
            .register_radio_mode_handler(RadioModeNotifier::new(self.queue.poster()));
        true
    }

    fn initialize_kernel(&mut self) -> bool {
        let death = DeathNotifier::new(SubsystemKind::KernelControl, self.queue.poster());
        if !self.clients.kernel.set_death_notifier(death) {
            warn!(
                target: "wlan_lifecycle::coordinator",
                "kernel death handler registration failed"
            );
            return false;
        }
        if !self.clients.kernel.tear_down_interfaces() {
            warn!(target: "wlan_lifecycle::coordinator", "failed to clear stale kernel interfaces");
            return false;
        }
        true
    }

    /// Registers the single aggregate status listener, replacing any
    /// previous one.
    pub fn register_status_listener(&mut self, listener: Box<dyn StatusListener>) {
        self.status_listener = Some(listener);
    }

    /// Registers the country code listener, replacing any previous one.
    pub fn register_country_code_listener(&mut self, listener: Box<dyn CountryCodeListener>) {
        self.country_code_listener = Some(listener);
    }

    /// Names of published station interfaces.
    #[must_use]
    pub fn client_interface_names(&self) -> BTreeSet<String> {
        self.registry.names(RoleFamily::Station)
    }

    /// Names of published access-point interfaces.
    #[must_use]
    pub fn soft_ap_interface_names(&self) -> BTreeSet<String> {
        self.registry.names(RoleFamily::AccessPoint)
    }

    /// Role of a published interface.
    #[must_use]
    pub fn interface_role(&self, name: &str) -> Option<InterfaceRole> {
        self.registry.get(name).map(|entry| entry.role)
    }

    /// Queries the link facility for the operational state of `name`.
    pub fn is_interface_up(&mut self, name: &str) -> bool {
        self.clients.link.is_interface_up(name)
    }

    /// Cached feature bits for `name`, or the last value cached for any
    /// interface when `name` is not registered.
    #[must_use]
    pub fn supported_feature_set(&self, name: &str) -> u64 {
        self.registry
            .get(name)
            .map_or(self.last_feature_set, |entry| entry.capabilities.feature_set)
    }

    /// Cached driver feature bits for `name`.
    #[must_use]
    pub fn driver_feature_set(&self, name: &str) -> u64 {
        self.registry
            .get(name)
            .map_or(0, |entry| entry.capabilities.driver_features)
    }

    /// Cached supported bands for `name`.
    #[must_use]
    pub fn supported_bands(&self, name: &str) -> BTreeSet<Band> {
        self.registry
            .get(name)
            .map(|entry| entry.capabilities.supported_bands.clone())
            .unwrap_or_default()
    }

    /// Instance names behind a bridged access point.
    #[must_use]
    pub fn bridged_instances(&self, name: &str) -> Vec<String> {
        self.registry
            .get(name)
            .map(|entry| entry.bridged_instances.clone())
            .unwrap_or_default()
    }

    /// Per-subsystem health flags.
    #[must_use]
    pub const fn health_snapshot(&self) -> SubsystemHealth {
        self.health
    }

    /// Aggregate readiness across the subsystems currently required.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        SubsystemKind::ALL
            .into_iter()
            .filter(|kind| self.is_required(*kind))
            .all(|kind| self.health.is_up(kind))
    }

    fn is_required(&self, kind: SubsystemKind) -> bool {
        match kind {
            SubsystemKind::ResourceLayer => self.clients.resource.is_supported(),
            SubsystemKind::KernelControl => true,
            daemon => self.registry.daemon_in_use(daemon, None),
        }
    }

    /// Caches coexistence restrictions and applies them if the resource
    /// layer is running.
    pub fn set_coex_unsafe_channels(
        &mut self,
        channels: Vec<CoexUnsafeChannel>,
        restrictions: u32,
    ) -> bool {
        self.coex = CoexConstraint {
            channels,
            restrictions,
        };
        if !self.clients.resource.is_started() {
            return true;
        }
        self.clients
            .resource
            .set_coex_unsafe_channels(&self.coex.channels, restrictions)
    }

    /// Reports whether a station interface could be created for
    /// `work_source`.
    pub fn can_create_station(&mut self, work_source: &WorkSource) -> bool {
        self.can_create(IfaceKind::Station, work_source)
    }

    /// Reports whether an access point could be created for `work_source`.
    pub fn can_create_access_point(&mut self, work_source: &WorkSource, bridged: bool) -> bool {
        let kind = if bridged {
            IfaceKind::BridgedAccessPoint
        } else {
            IfaceKind::AccessPoint
        };
        self.can_create(kind, work_source)
    }

    fn can_create(&mut self, kind: IfaceKind, work_source: &WorkSource) -> bool {
        let resource = &mut self.clients.resource;
        if !resource.is_supported() {
            return !self.registry.any_live(None);
        }
        if !resource.is_started() {
            return resource.device_supports(kind);
        }
        resource.is_possible_to_create(kind, work_source)
    }

    /// Re-attributes an existing station interface to `work_source`.
    pub fn replace_station_requestor(&mut self, name: &str, work_source: &WorkSource) -> bool {
        let Some(entry) = self.registry.get(name) else {
            warn!(target: "wlan_lifecycle::coordinator", interface = name, "unknown interface");
            return false;
        };
        if !entry.role.is_station() {
            return false;
        }
        if !self.clients.resource.is_supported() {
            return true;
        }
        self.clients
            .resource
            .replace_station_iface_requestor(name, work_source)
    }

    /// Processes every queued event, returning how many were handled.
    ///
    /// Events are otherwise handled only at safe points: directly after a
    /// resource-layer create or remove call the coordinator handles pending
    /// destruction events and defers everything else to this method.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.deferred.pop_front().or_else(|| self.queue.try_next()) {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handles destruction events now and defers the rest.
    fn process_destructions(&mut self) {
        while let Some(event) = self.queue.try_next() {
            match event {
                Event::InterfaceDestroyed { listener, name } => {
                    self.handle_destruction(listener, &name);
                }
                other => self.deferred.push_back(other),
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::InterfaceDestroyed { listener, name } => {
                self.handle_destruction(listener, &name);
            }
            Event::SubsystemDied(kind) => self.handle_subsystem_death(kind),
            Event::InterfaceStateChanged { observer, name, .. } => {
                self.bridge_interface_state(observer, &name);
            }
            Event::LinkStateChanged { name, up, .. } => {
                debug!(
                    target: "wlan_lifecycle::link",
                    interface = %name,
                    up,
                    "ignoring link-layer state change"
                );
            }
            Event::Scan { name, event } => self.forward_scan_event(&name, event),
            Event::RadioModeChanged(mode) => self.record_radio_mode(mode),
            Event::CountryCodeChanged(code) => self.forward_country_code(&code),
        }
    }

    fn daemon_mut(&mut self, daemon: SubsystemKind) -> &mut dyn DaemonClient {
        match daemon {
            SubsystemKind::AccessPointDaemon => &mut *self.clients.ap_daemon,
            _ => &mut *self.clients.station_daemon,
        }
    }

    fn notify_status(&self, ready: bool) {
        if let Some(listener) = &self.status_listener {
            listener.on_status_changed(ready);
        }
    }
}
