//! Recording link facility and event monitor doubles.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clients::{EventMonitor, LinkObserverRegistry};
use crate::events::{LinkObserver, ObserverId, ScanEvent};

use super::log::{Call, CallLog};

#[derive(Debug, Default)]
struct LinkState {
    up: BTreeMap<String, bool>,
    observers: Vec<LinkObserver>,
    registered: BTreeSet<ObserverId>,
}

/// Link facility double. It keeps every observer ever registered so tests
/// can deliver events through stale handles.
#[derive(Debug, Clone)]
pub struct RecordingLink {
    shared: Arc<Mutex<LinkState>>,
    log: CallLog,
}

impl RecordingLink {
    /// Creates a link double where every interface starts down.
    pub fn new(log: CallLog) -> Self {
        Self {
            shared: Arc::new(Mutex::new(LinkState::default())),
            log,
        }
    }

    fn state(&self) -> MutexGuard<'_, LinkState> {
        self.shared.lock().expect("link state mutex poisoned")
    }

    /// Sets the authoritative state for `name` without notifying anyone.
    pub fn set_up(&self, name: &str, up: bool) {
        self.state().up.insert(name.to_owned(), up);
    }

    /// Sets the state for `name` and notifies its registered observers.
    pub fn report_state(&self, name: &str, up: bool) {
        self.set_up(name, up);
        for observer in self.registered_observers(name) {
            observer.interface_state_changed(name, up);
        }
    }

    /// Notifies registered observers of a link-layer-only change.
    pub fn report_link_layer(&self, name: &str, up: bool) {
        for observer in self.registered_observers(name) {
            observer.link_state_changed(name, up);
        }
    }

    /// Every observer ever registered for `name`, oldest first.
    pub fn observers_for(&self, name: &str) -> Vec<LinkObserver> {
        self.state()
            .observers
            .iter()
            .filter(|observer| observer.interface() == name)
            .cloned()
            .collect()
    }

    /// Observers for `name` that are still registered.
    pub fn registered_observers(&self, name: &str) -> Vec<LinkObserver> {
        let state = self.state();
        state
            .observers
            .iter()
            .filter(|observer| {
                observer.interface() == name && state.registered.contains(&observer.id())
            })
            .cloned()
            .collect()
    }
}

impl LinkObserverRegistry for RecordingLink {
    fn register_observer(&mut self, observer: LinkObserver) {
        self.log
            .record(Call::RegisterObserver(observer.interface().to_owned()));
        let mut state = self.state();
        state.registered.insert(observer.id());
        state.observers.push(observer);
    }

    fn unregister_observer(&mut self, id: ObserverId) {
        self.log.record(Call::UnregisterObserver(id));
        self.state().registered.remove(&id);
    }

    fn is_interface_up(&mut self, name: &str) -> bool {
        self.log.record(Call::IsInterfaceUp(name.to_owned()));
        self.state().up.get(name).copied().unwrap_or(false)
    }

    fn clear_interface_addresses(&mut self, name: &str) {
        self.log.record(Call::ClearAddresses(name.to_owned()));
    }

    fn set_ipv6_privacy_extensions(&mut self, name: &str, enabled: bool) {
        self.log.record(Call::Ipv6Privacy(name.to_owned(), enabled));
    }

    fn disable_ipv6(&mut self, name: &str) {
        self.log.record(Call::DisableIpv6(name.to_owned()));
    }
}

/// Event monitor double.
#[derive(Debug, Clone)]
pub struct RecordingMonitor {
    log: CallLog,
}

impl RecordingMonitor {
    /// Creates a monitor that only records.
    pub const fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl EventMonitor for RecordingMonitor {
    fn start_monitoring(&mut self, name: &str) {
        self.log.record(Call::StartMonitoring(name.to_owned()));
    }

    fn stop_monitoring(&mut self, name: &str) {
        self.log.record(Call::StopMonitoring(name.to_owned()));
    }

    fn broadcast_scan_event(&mut self, name: &str, event: ScanEvent) {
        self.log.record(Call::Broadcast(name.to_owned(), event));
    }
}
