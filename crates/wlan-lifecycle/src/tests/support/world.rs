//! Shared fixture wiring a coordinator to recording doubles.

use std::sync::Arc;

use rstest::fixture;
use wlan_config::Config;

use crate::coordinator::{Coordinator, Subsystems};
use crate::role::{AccessPointRequest, ApManagerId, Band, WorkSource};
use crate::subsystem::SubsystemKind;

use super::daemon::RecordingDaemon;
use super::kernel::RecordingKernel;
use super::link::{RecordingLink, RecordingMonitor};
use super::log::{Call, CallLog, CallbackEvent};
use super::resource::RecordingResourceLayer;
use super::sinks::{
    RecordingCallback, RecordingCountryCodeListener, RecordingMetrics, RecordingReporter,
    RecordingStatusListener,
};

/// A coordinator plus handles on every double it talks to.
pub struct TestWorld {
    pub coordinator: Coordinator,
    pub log: CallLog,
    pub resource: RecordingResourceLayer,
    pub kernel: RecordingKernel,
    pub station_daemon: RecordingDaemon,
    pub ap_daemon: RecordingDaemon,
    pub link: RecordingLink,
    pub metrics: Arc<RecordingMetrics>,
    pub reporter: Arc<RecordingReporter>,
    pub status: RecordingStatusListener,
    pub country_codes: RecordingCountryCodeListener,
}

impl TestWorld {
    /// Builds and initialises a coordinator with a supported resource layer.
    pub fn new() -> Self {
        Self::build(true, test_config())
    }

    /// Builds a coordinator whose connectivity stations enable the
    /// network-centric QoS policy.
    pub fn with_network_centric_qos() -> Self {
        Self::build(
            true,
            Config {
                network_centric_qos_policy: true,
                ..test_config()
            },
        )
    }

    /// Builds and initialises a coordinator on a device without a resource
    /// layer.
    pub fn without_resource_layer() -> Self {
        Self::build(false, test_config())
    }

    fn build(supported: bool, config: Config) -> Self {
        let log = CallLog::default();
        let resource = RecordingResourceLayer::new(log.clone());
        resource.set_supported(supported);
        let kernel = RecordingKernel::new(log.clone());
        let station_daemon = RecordingDaemon::new(SubsystemKind::StationDaemon, log.clone());
        let ap_daemon = RecordingDaemon::new(SubsystemKind::AccessPointDaemon, log.clone());
        let link = RecordingLink::new(log.clone());
        let metrics = Arc::new(RecordingMetrics::default());
        let reporter = Arc::new(RecordingReporter::default());
        let status = RecordingStatusListener::default();
        let country_codes = RecordingCountryCodeListener::default();

        let clients = Subsystems {
            resource: Box::new(resource.clone()),
            kernel: Box::new(kernel.clone()),
            station_daemon: Box::new(station_daemon.clone()),
            ap_daemon: Box::new(ap_daemon.clone()),
            link: Box::new(link.clone()),
            monitor: Box::new(RecordingMonitor::new(log.clone())),
            metrics: Box::new(Arc::clone(&metrics)),
        };
        let mut coordinator =
            Coordinator::new(clients, &config).with_reporter(Box::new(Arc::clone(&reporter)));
        coordinator.register_status_listener(Box::new(status.clone()));
        coordinator.register_country_code_listener(Box::new(country_codes.clone()));
        assert!(coordinator.initialize(), "initialisation should succeed");
        log.clear();

        Self {
            coordinator,
            log,
            resource,
            kernel,
            station_daemon,
            ap_daemon,
            link,
            metrics,
            reporter,
            status,
            country_codes,
        }
    }

    /// A callback recording into the shared log.
    pub fn callback(&self) -> Box<RecordingCallback> {
        Box::new(RecordingCallback::new(self.log.clone()))
    }

    /// Sets up a connectivity station.
    pub fn setup_station(&mut self) -> Option<String> {
        let callback = self.callback();
        self.coordinator
            .setup_client_for_connectivity(callback, &work_source())
    }

    /// Sets up a scan-only station.
    pub fn setup_scan_station(&mut self) -> Option<String> {
        let callback = self.callback();
        self.coordinator.setup_client_for_scan(callback, &work_source())
    }

    /// Sets up an access point, bridged or not.
    pub fn setup_access_point(&mut self, bridged: bool) -> Option<String> {
        let callback = self.callback();
        self.coordinator
            .setup_soft_ap(callback, &work_source(), access_point_request(bridged))
    }

    /// Drains queued events through the coordinator.
    pub fn dispatch(&mut self) -> usize {
        self.coordinator.dispatch_pending()
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.log.calls()
    }

    /// Interface callbacks delivered so far.
    pub fn callbacks(&self) -> Vec<CallbackEvent> {
        self.log.callbacks()
    }

    /// How often `name` received `on_destroyed`.
    pub fn destroyed_count(&self, name: &str) -> usize {
        self.callbacks()
            .iter()
            .filter(|event| **event == CallbackEvent::Destroyed(name.to_owned()))
            .count()
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config() -> Config {
    Config {
        daemon_ready_attempts: 2,
        daemon_ready_poll_interval_ms: 0,
        ..Config::default()
    }
}

/// Work source used by every test request.
pub fn work_source() -> WorkSource {
    WorkSource::new([1000])
}

/// Access-point request on 2.4 GHz.
pub const fn access_point_request(bridged: bool) -> AccessPointRequest {
    AccessPointRequest {
        band: Band::Ghz24,
        bridged,
        manager: ApManagerId(7),
    }
}

#[fixture]
pub fn world() -> TestWorld {
    TestWorld::new()
}
