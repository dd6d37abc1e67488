//! Recording protocol daemon double, shared by both daemon kinds.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::clients::{DaemonClient, StationDaemon};
use crate::events::DeathNotifier;
use crate::subsystem::SubsystemKind;

use super::log::{Call, CallLog, DaemonCall};

#[derive(Debug, Default)]
struct DaemonState {
    fail_initialize: bool,
    fail_start: bool,
    never_ready: bool,
    fail_setup_iface: bool,
    fail_teardown_iface: bool,
    refuse_qos_policy: bool,
    initialized: bool,
    running: bool,
    readiness_polls: u32,
    death_registered: bool,
    death: Option<DeathNotifier>,
}

/// Daemon double that records its lifecycle in the shared log.
#[derive(Debug, Clone)]
pub struct RecordingDaemon {
    kind: SubsystemKind,
    shared: Arc<Mutex<DaemonState>>,
    log: CallLog,
}

impl RecordingDaemon {
    /// Creates a cooperative daemon of `kind`.
    pub fn new(kind: SubsystemKind, log: CallLog) -> Self {
        Self {
            kind,
            shared: Arc::new(Mutex::new(DaemonState::default())),
            log,
        }
    }

    fn state(&self) -> MutexGuard<'_, DaemonState> {
        self.shared.lock().expect("daemon state mutex poisoned")
    }

    fn record(&self, call: DaemonCall) {
        self.log.record(Call::Daemon(self.kind, call));
    }

    /// Makes `initialize` fail.
    pub fn fail_initialize(&self) {
        self.state().fail_initialize = true;
    }

    /// Makes `start_daemon` fail.
    pub fn fail_start(&self) {
        self.state().fail_start = true;
    }

    /// Lets `start_daemon` succeed after a previous failure.
    pub fn allow_start(&self) {
        self.state().fail_start = false;
    }

    /// Never reports initialisation as complete.
    pub fn never_ready(&self) {
        self.state().never_ready = true;
    }

    /// Makes `setup_iface` fail.
    pub fn fail_setup_iface(&self) {
        self.state().fail_setup_iface = true;
    }

    /// Makes `teardown_iface` fail.
    pub fn fail_teardown_iface(&self) {
        self.state().fail_teardown_iface = true;
    }

    /// Makes `set_network_centric_qos_policy` fail.
    pub fn refuse_qos_policy(&self) {
        self.state().refuse_qos_policy = true;
    }

    /// Returns whether the process is running.
    pub fn running(&self) -> bool {
        self.state().running
    }

    /// How often readiness was polled.
    pub fn readiness_polls(&self) -> u32 {
        self.state().readiness_polls
    }

    /// Reports the daemon's death through the last notifier it was given,
    /// even if that notifier has since been deregistered.
    pub fn die(&self) {
        let death = {
            let mut state = self.state();
            state.running = false;
            state.initialized = false;
            state.death.clone()
        };
        if let Some(callback) = death {
            callback.subsystem_died();
        }
    }
}

impl DaemonClient for RecordingDaemon {
    fn is_initialization_started(&self) -> bool {
        self.state().initialized
    }

    fn initialize(&mut self) -> bool {
        self.record(DaemonCall::Initialize);
        let mut state = self.state();
        if state.fail_initialize {
            return false;
        }
        state.initialized = true;
        true
    }

    fn start_daemon(&mut self) -> bool {
        self.record(DaemonCall::StartDaemon);
        let mut state = self.state();
        if state.fail_start {
            return false;
        }
        state.running = true;
        true
    }

    fn is_initialization_complete(&self) -> bool {
        let mut state = self.state();
        state.readiness_polls += 1;
        state.running && !state.never_ready
    }

    fn register_death_handler(&mut self, death: DeathNotifier) -> bool {
        self.record(DaemonCall::RegisterDeathHandler);
        let mut state = self.state();
        state.death = Some(death);
        state.death_registered = true;
        true
    }

    fn deregister_death_handler(&mut self) -> bool {
        self.record(DaemonCall::DeregisterDeathHandler);
        std::mem::take(&mut self.state().death_registered)
    }

    fn setup_iface(&mut self, name: &str) -> bool {
        self.record(DaemonCall::SetupIface(name.to_owned()));
        !self.state().fail_setup_iface
    }

    fn teardown_iface(&mut self, name: &str) -> bool {
        self.record(DaemonCall::TeardownIface(name.to_owned()));
        !self.state().fail_teardown_iface
    }

    fn terminate(&mut self) {
        self.record(DaemonCall::Terminate);
        let mut state = self.state();
        state.running = false;
        state.initialized = false;
    }
}

impl StationDaemon for RecordingDaemon {
    fn advanced_capabilities(&mut self, name: &str) -> u64 {
        self.record(DaemonCall::AdvancedCapabilities(name.to_owned()));
        0b1_0000
    }

    fn driver_feature_set(&mut self, name: &str) -> u64 {
        self.record(DaemonCall::DriverFeatureSet(name.to_owned()));
        0b11
    }

    fn set_network_centric_qos_policy(&mut self, name: &str, enabled: bool) -> bool {
        self.record(DaemonCall::SetQosPolicy(name.to_owned(), enabled));
        !self.state().refuse_qos_policy
    }
}
