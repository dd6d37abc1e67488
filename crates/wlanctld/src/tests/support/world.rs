//! Scenario world shared by the service unit and behaviour tests.

use std::sync::Arc;

use rstest::fixture;
use tempfile::TempDir;
use wlan_config::Config;
use wlan_lifecycle::WorkSource;

use crate::{
    BootstrapError, ConfigLoader, FileConfigLoader, Service, ServiceHandle, StaticConfigLoader,
    bootstrap_with,
};

use super::mocks::Notifications;
use super::reporter::RecordingHealthReporter;
use super::subsystems::{Controls, subsystems};

/// Configuration with instant daemon readiness polling.
pub fn test_config() -> Config {
    Config {
        daemon_ready_attempts: 2,
        daemon_ready_poll_interval_ms: 0,
        ..Config::default()
    }
}

/// Work source used for every request.
pub fn work_source() -> WorkSource {
    WorkSource::new([1010])
}

/// Loader, subsystem doubles and bootstrap outcome.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    pub controls: Controls,
    pub notifications: Notifications,
    service: Option<Service>,
    bootstrap_error: Option<BootstrapError>,
    config_dir: Option<TempDir>,
}

impl TestWorld {
    /// Builds a world with a valid in-memory configuration.
    pub fn new() -> Self {
        Self {
            loader: Box::new(StaticConfigLoader::new(test_config())),
            reporter: Arc::new(RecordingHealthReporter::default()),
            controls: Controls::default(),
            notifications: Notifications::default(),
            service: None,
            bootstrap_error: None,
            config_dir: None,
        }
    }

    /// Replaces the loader with one reading `document` from a file.
    pub fn use_config_file(&mut self, document: &str) {
        let dir = TempDir::new().expect("create temporary directory");
        let path = dir.path().join("wlanctld.toml");
        std::fs::write(&path, document).expect("write configuration file");
        self.loader = Box::new(FileConfigLoader::new(path));
        self.config_dir = Some(dir);
    }

    /// Replaces the loader with one pointing at a file that does not exist.
    pub fn use_missing_config_file(&mut self) {
        let dir = TempDir::new().expect("create temporary directory");
        self.loader = Box::new(FileConfigLoader::new(dir.path().join("absent.toml")));
        self.config_dir = Some(dir);
    }

    /// Replaces the loader with a static configuration.
    pub fn use_config(&mut self, config: Config) {
        self.loader = Box::new(StaticConfigLoader::new(config));
    }

    /// Runs bootstrap over fresh subsystem doubles. Tweaks applied through
    /// `prepare` see the controls before the coordinator initialises.
    pub fn bootstrap_with_controls(&mut self, prepare: impl FnOnce(&Controls)) {
        let (clients, controls) = subsystems();
        prepare(&controls);
        self.controls = controls;
        match bootstrap_with(&*self.loader, &self.reporter, clients) {
            Ok(service) => self.service = Some(service),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Runs bootstrap over cooperative subsystem doubles.
    pub fn bootstrap(&mut self) {
        self.bootstrap_with_controls(|_| {});
    }

    /// The bootstrap error, if bootstrap failed.
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// The running service.
    pub fn service(&self) -> &Service {
        self.service.as_ref().expect("service bootstrapped")
    }

    /// Handle to the running service.
    pub fn handle(&self) -> &ServiceHandle {
        self.service().handle()
    }

    /// Takes ownership of the service, leaving the world without one.
    pub fn take_service(&mut self) -> Service {
        self.service.take().expect("service bootstrapped")
    }

    /// Creates a connectivity station whose callback records into
    /// [`TestWorld::notifications`].
    pub fn setup_station(&self) -> Option<String> {
        self.handle()
            .setup_client_for_connectivity(self.notifications.callback(), &work_source())
            .expect("service running")
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// A world whose service is already running.
#[fixture]
pub fn running() -> TestWorld {
    let mut world = TestWorld::new();
    world.bootstrap();
    assert!(world.bootstrap_error().is_none(), "{:?}", world.bootstrap_error());
    world
}
