//! Recording kernel control double.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clients::KernelControl;
use crate::events::{CountryCodeNotifier, DeathNotifier, ScanEvent, ScanEventNotifier};
use crate::role::Band;

use super::log::{Call, CallLog};

#[derive(Debug, Default)]
struct KernelState {
    fail_client_setup: bool,
    fail_soft_ap_setup: bool,
    death: Option<DeathNotifier>,
    country_code: Option<CountryCodeNotifier>,
    scan_events: BTreeMap<String, ScanEventNotifier>,
    channels: BTreeMap<Band, Vec<u32>>,
}

/// Kernel control double that records bindings and holds the notifiers the
/// coordinator registers.
#[derive(Debug, Clone)]
pub struct RecordingKernel {
    shared: Arc<Mutex<KernelState>>,
    log: CallLog,
}

impl RecordingKernel {
    /// Creates a kernel double that accepts every binding.
    pub fn new(log: CallLog) -> Self {
        Self {
            shared: Arc::new(Mutex::new(KernelState::default())),
            log,
        }
    }

    fn state(&self) -> MutexGuard<'_, KernelState> {
        self.shared.lock().expect("kernel state mutex poisoned")
    }

    /// Makes client-mode bindings fail.
    pub fn fail_client_setup(&self) {
        self.state().fail_client_setup = true;
    }

    /// Makes soft-AP bindings fail.
    pub fn fail_soft_ap_setup(&self) {
        self.state().fail_soft_ap_setup = true;
    }

    /// Sets the channels reported for `band`.
    pub fn set_channels(&self, band: Band, channels: Vec<u32>) {
        self.state().channels.insert(band, channels);
    }

    /// Reports the kernel layer's death.
    pub fn die(&self) {
        let death = self.state().death.clone();
        if let Some(callback) = death {
            callback.subsystem_died();
        }
    }

    /// Reports a country code change.
    pub fn report_country_code(&self, code: &str) {
        let notifier = self.state().country_code.clone();
        if let Some(callback) = notifier {
            callback.country_code_changed(code);
        }
    }

    /// Reports a scan completion on `name`.
    pub fn report_scan(&self, name: &str, event: ScanEvent) {
        let notifier = self.state().scan_events.get(name).cloned();
        if let Some(callback) = notifier {
            callback.notify(event);
        }
    }
}

impl KernelControl for RecordingKernel {
    fn set_death_notifier(&mut self, death: DeathNotifier) -> bool {
        self.log.record(Call::KernelSetDeathNotifier);
        self.state().death = Some(death);
        true
    }

    fn register_country_code_listener(&mut self, notifier: CountryCodeNotifier) -> bool {
        self.log.record(Call::KernelRegisterCountryCode);
        self.state().country_code = Some(notifier);
        true
    }

    fn setup_client_interface(&mut self, name: &str, scan_events: ScanEventNotifier) -> bool {
        self.log.record(Call::KernelSetupClient(name.to_owned()));
        let mut state = self.state();
        if state.fail_client_setup {
            return false;
        }
        state.scan_events.insert(name.to_owned(), scan_events);
        true
    }

    fn setup_soft_ap_interface(&mut self, name: &str) -> bool {
        self.log.record(Call::KernelSetupSoftAp(name.to_owned()));
        !self.state().fail_soft_ap_setup
    }

    fn tear_down_client_interface(&mut self, name: &str) -> bool {
        self.log.record(Call::KernelTearDownClient(name.to_owned()));
        self.state().scan_events.remove(name).is_some()
    }

    fn tear_down_soft_ap_interface(&mut self, name: &str) -> bool {
        self.log.record(Call::KernelTearDownSoftAp(name.to_owned()));
        true
    }

    fn tear_down_interfaces(&mut self) -> bool {
        self.log.record(Call::KernelTearDownAll);
        self.state().scan_events.clear();
        true
    }

    fn channels_for_band(&mut self, band: Band) -> Vec<u32> {
        self.state().channels.get(&band).cloned().unwrap_or_default()
    }
}
