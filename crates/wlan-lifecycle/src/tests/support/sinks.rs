//! Recording doubles for metrics, listeners, callbacks and the reporter.

use std::sync::{Arc, Mutex};

use crate::clients::{CountryCodeListener, InterfaceCallback, StatusListener};
use crate::errors::SetupError;
use crate::metrics::{Counter, MetricsSink};
use crate::reporter::LifecycleReporter;
use crate::role::InterfaceRole;
use crate::subsystem::SubsystemKind;

use super::log::{Call, CallLog, CallbackEvent};

/// Records every counter increment.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    counters: Mutex<Vec<Counter>>,
}

impl RecordingMetrics {
    /// How often `counter` was incremented.
    pub fn count(&self, counter: Counter) -> usize {
        self.counters
            .lock()
            .expect("metrics mutex poisoned")
            .iter()
            .filter(|recorded| **recorded == counter)
            .count()
    }

    /// Every increment in order.
    pub fn all(&self) -> Vec<Counter> {
        self.counters.lock().expect("metrics mutex poisoned").clone()
    }
}

impl MetricsSink for RecordingMetrics {
    fn increment(&self, counter: Counter) {
        self.counters
            .lock()
            .expect("metrics mutex poisoned")
            .push(counter);
    }
}

/// Interface callback that writes into the shared call log.
#[derive(Debug, Clone)]
pub struct RecordingCallback {
    log: CallLog,
}

impl RecordingCallback {
    /// Creates a callback recording into `log`.
    pub const fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl InterfaceCallback for RecordingCallback {
    fn on_up(&self, name: &str) {
        self.log
            .record(Call::Callback(CallbackEvent::Up(name.to_owned())));
    }

    fn on_down(&self, name: &str) {
        self.log
            .record(Call::Callback(CallbackEvent::Down(name.to_owned())));
    }

    fn on_destroyed(&self, name: &str) {
        self.log.record(Call::destroyed(name));
    }
}

/// Records aggregate status notifications.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusListener {
    statuses: Arc<Mutex<Vec<bool>>>,
}

impl RecordingStatusListener {
    /// Notifications received so far.
    pub fn statuses(&self) -> Vec<bool> {
        self.statuses.lock().expect("status mutex poisoned").clone()
    }
}

impl StatusListener for RecordingStatusListener {
    fn on_status_changed(&self, ready: bool) {
        self.statuses
            .lock()
            .expect("status mutex poisoned")
            .push(ready);
    }
}

/// Records country code notifications.
#[derive(Debug, Clone, Default)]
pub struct RecordingCountryCodeListener {
    codes: Arc<Mutex<Vec<String>>>,
}

impl RecordingCountryCodeListener {
    /// Codes received so far.
    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().expect("country code mutex poisoned").clone()
    }
}

impl CountryCodeListener for RecordingCountryCodeListener {
    fn on_country_code_changed(&self, country_code: &str) {
        self.codes
            .lock()
            .expect("country code mutex poisoned")
            .push(country_code.to_owned());
    }
}

/// Lifecycle milestones tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    SubsystemStarting(SubsystemKind),
    SubsystemReady(SubsystemKind),
    SubsystemFailed(SubsystemKind),
    SubsystemDied(SubsystemKind),
    SubsystemRecovered(SubsystemKind),
    Published(String, InterfaceRole),
    Destroyed(String, InterfaceRole),
    SetupFailed(InterfaceRole, SetupError),
}

/// Records lifecycle milestones for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: ReportEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn subsystem_starting(&self, kind: SubsystemKind) {
        self.record(ReportEvent::SubsystemStarting(kind));
    }

    fn subsystem_ready(&self, kind: SubsystemKind) {
        self.record(ReportEvent::SubsystemReady(kind));
    }

    fn subsystem_failed(&self, kind: SubsystemKind) {
        self.record(ReportEvent::SubsystemFailed(kind));
    }

    fn subsystem_died(&self, kind: SubsystemKind) {
        self.record(ReportEvent::SubsystemDied(kind));
    }

    fn subsystem_recovered(&self, kind: SubsystemKind) {
        self.record(ReportEvent::SubsystemRecovered(kind));
    }

    fn interface_published(&self, name: &str, role: InterfaceRole) {
        self.record(ReportEvent::Published(name.to_owned(), role));
    }

    fn interface_destroyed(&self, name: &str, role: InterfaceRole) {
        self.record(ReportEvent::Destroyed(name.to_owned(), role));
    }

    fn setup_failed(&self, role: InterfaceRole, error: &SetupError) {
        self.record(ReportEvent::SetupFailed(role, error.clone()));
    }
}
