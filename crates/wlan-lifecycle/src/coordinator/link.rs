//! Bridging of link, scan, radio mode and country code notifications.

use tracing::debug;

use super::Coordinator;
use crate::events::{ObserverId, RadioMode, ScanEvent};
use crate::metrics::Counter;

impl Coordinator {
    /// Delivers `on_up`/`on_down` for a state change, re-reading the state
    /// from the link facility instead of trusting the event.
    pub(super) fn bridge_interface_state(&mut self, observer: ObserverId, name: &str) {
        let current = self.registry.get(name).map(|entry| entry.observer);
        if current != Some(observer) {
            debug!(
                target: "wlan_lifecycle::link",
                interface = name,
                "ignoring state change from a stale observer"
            );
            return;
        }
        let up = self.clients.link.is_interface_up(name);
        let Some(entry) = self.registry.get_mut(name) else {
            return;
        };
        if entry.up == up {
            return;
        }
        entry.up = up;
        if up {
            entry.callback.on_up(name);
        } else {
            entry.callback.on_down(name);
            self.clients
                .metrics
                .increment(Counter::InterfaceDown(entry.role.family()));
        }
    }

    pub(super) fn forward_scan_event(&mut self, name: &str, event: ScanEvent) {
        let is_station = self
            .registry
            .get(name)
            .is_some_and(|entry| entry.role.is_station());
        if !is_station {
            debug!(
                target: "wlan_lifecycle::link",
                interface = name,
                ?event,
                "dropping scan event for unregistered interface"
            );
            return;
        }
        match event {
            ScanEvent::ResultsReady | ScanEvent::Failed => {
                self.clients.monitor.broadcast_scan_event(name, event);
            }
            ScanEvent::PnoNetworkFound => {
                self.clients.monitor.broadcast_scan_event(name, event);
                self.clients.metrics.increment(Counter::PnoNetworkFound);
            }
            ScanEvent::PnoScanFailed => {
                self.clients.metrics.increment(Counter::PnoScanFailed);
            }
        }
    }

    pub(super) fn record_radio_mode(&self, mode: RadioMode) {
        self.clients.metrics.increment(Counter::RadioModeChange(mode));
    }

    pub(super) fn forward_country_code(&self, country_code: &str) {
        let Some(listener) = &self.country_code_listener else {
            debug!(
                target: "wlan_lifecycle::link",
                country_code,
                "no country code listener registered"
            );
            return;
        };
        listener.on_country_code_changed(country_code);
    }
}
