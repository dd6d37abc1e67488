//! Narrow interfaces to the external subsystems and caller-side sinks.
//!
//! The coordinator owns one boxed implementation of each client. Methods
//! report failure through their return values; asynchronous signals (death,
//! destruction, link changes) arrive through the handles in
//! [`crate::events`].

use crate::events::{
    CountryCodeNotifier, DeathNotifier, DestructionListener, LinkObserver, ObserverId,
    RadioModeNotifier, ScanEvent, ScanEventNotifier,
};
use crate::role::{AccessPointRequest, Band, IfaceKind, WorkSource};

/// A channel the radio may operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsableChannel {
    /// Centre frequency in MHz.
    pub frequency_mhz: u32,
}

/// A channel the radio should avoid because of coexistence interference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoexUnsafeChannel {
    /// Band the channel belongs to.
    pub band: Band,
    /// Channel number within the band.
    pub channel: u32,
    /// Transmit power cap in dBm, when one applies.
    pub power_cap_dbm: Option<i32>,
}

/// Vendor layer that owns radio resources and allocates interface names.
pub trait ResourceLayer: Send {
    /// Reports whether the device ships this layer at all.
    fn is_supported(&self) -> bool;

    /// Reports whether the layer is reachable.
    fn is_ready(&self) -> bool;

    /// Reports whether [`ResourceLayer::start`] has succeeded and not been
    /// undone by [`ResourceLayer::stop`].
    fn is_started(&self) -> bool;

    /// Connects to the layer and registers its death handler.
    fn initialize(&mut self, death: DeathNotifier) -> bool;

    /// Registers the radio concurrency mode handler.
    fn register_radio_mode_handler(&mut self, handler: RadioModeNotifier);

    /// Powers the radio layer up.
    fn start(&mut self) -> bool;

    /// Powers the radio layer down, releasing every interface.
    fn stop(&mut self);

    /// Applies coexistence channel restrictions.
    fn set_coex_unsafe_channels(&mut self, channels: &[CoexUnsafeChannel], restrictions: u32)
    -> bool;

    /// Allocates a station interface, returning its name.
    fn create_station_iface(
        &mut self,
        listener: DestructionListener,
        work_source: &WorkSource,
    ) -> Option<String>;

    /// Allocates an access-point interface, returning its name.
    fn create_access_point_iface(
        &mut self,
        listener: DestructionListener,
        work_source: &WorkSource,
        request: &AccessPointRequest,
    ) -> Option<String>;

    /// Releases a station interface.
    fn remove_station_iface(&mut self, name: &str) -> bool;

    /// Releases an access-point interface.
    fn remove_access_point_iface(&mut self, name: &str) -> bool;

    /// Re-attributes a station interface to a new requestor in place.
    fn replace_station_iface_requestor(&mut self, name: &str, work_source: &WorkSource) -> bool;

    /// Returns the instance names backing a bridged access point.
    fn bridged_ap_instances(&mut self, name: &str) -> Option<Vec<String>>;

    /// Returns the vendor feature bit set for an interface.
    fn supported_feature_set(&mut self, name: &str) -> u64;

    /// Returns the channels usable on an interface.
    fn usable_channels(&mut self, name: &str) -> Option<Vec<UsableChannel>>;

    /// Turns on link-layer statistics collection.
    fn enable_link_layer_stats(&mut self, name: &str);

    /// Reports whether the device could ever host an interface of `kind`.
    fn device_supports(&self, kind: IfaceKind) -> bool;

    /// Reports whether an interface of `kind` could be created now on
    /// behalf of `work_source`, possibly by preempting others.
    fn is_possible_to_create(&mut self, kind: IfaceKind, work_source: &WorkSource) -> bool;
}

/// Kernel netlink control layer.
pub trait KernelControl: Send {
    /// Registers the death handler.
    fn set_death_notifier(&mut self, death: DeathNotifier) -> bool;

    /// Subscribes to regulatory country code changes.
    fn register_country_code_listener(&mut self, notifier: CountryCodeNotifier) -> bool;

    /// Binds an interface for client mode and routes its scan completions.
    fn setup_client_interface(&mut self, name: &str, scan_events: ScanEventNotifier) -> bool;

    /// Binds an interface for soft-AP mode.
    fn setup_soft_ap_interface(&mut self, name: &str) -> bool;

    /// Releases a client-mode binding.
    fn tear_down_client_interface(&mut self, name: &str) -> bool;

    /// Releases a soft-AP binding.
    fn tear_down_soft_ap_interface(&mut self, name: &str) -> bool;

    /// Releases every binding and global state.
    fn tear_down_interfaces(&mut self) -> bool;

    /// Returns the channel frequencies the driver allows in `band`.
    fn channels_for_band(&mut self, band: Band) -> Vec<u32>;
}

/// Client for a protocol daemon process.
pub trait DaemonClient: Send {
    /// Reports whether [`DaemonClient::initialize`] already ran.
    fn is_initialization_started(&self) -> bool;

    /// Prepares the client connection.
    fn initialize(&mut self) -> bool;

    /// Launches the daemon process.
    fn start_daemon(&mut self) -> bool;

    /// Reports whether the daemon finished starting.
    fn is_initialization_complete(&self) -> bool;

    /// Registers the death handler.
    fn register_death_handler(&mut self, death: DeathNotifier) -> bool;

    /// Removes the death handler.
    fn deregister_death_handler(&mut self) -> bool;

    /// Adopts a bound interface.
    fn setup_iface(&mut self, name: &str) -> bool;

    /// Releases an interface.
    fn teardown_iface(&mut self, name: &str) -> bool;

    /// Stops the daemon process.
    fn terminate(&mut self);
}

/// Station daemon client with its capability queries.
pub trait StationDaemon: DaemonClient {
    /// Returns advanced capability bits for a connectivity interface.
    fn advanced_capabilities(&mut self, name: &str) -> u64;

    /// Returns driver feature bits reported through the daemon.
    fn driver_feature_set(&mut self, name: &str) -> u64;

    /// Turns the network-centric QoS policy feature on or off for `name`.
    fn set_network_centric_qos_policy(&mut self, name: &str, enabled: bool) -> bool;
}

/// Network link facility that watches interface state.
pub trait LinkObserverRegistry: Send {
    /// Starts delivering state changes to `observer`.
    fn register_observer(&mut self, observer: LinkObserver);

    /// Stops delivering to the observer with identity `id`.
    fn unregister_observer(&mut self, id: ObserverId);

    /// Returns the authoritative operational state.
    fn is_interface_up(&mut self, name: &str) -> bool;

    /// Removes every address from an interface.
    fn clear_interface_addresses(&mut self, name: &str);

    /// Toggles IPv6 privacy extensions.
    fn set_ipv6_privacy_extensions(&mut self, name: &str, enabled: bool);

    /// Disables IPv6 until the station associates.
    fn disable_ipv6(&mut self, name: &str);
}

/// Fan-out point for station-side scan and supplicant events.
pub trait EventMonitor: Send {
    /// Starts routing events for `name`.
    fn start_monitoring(&mut self, name: &str);

    /// Stops routing events for `name`.
    fn stop_monitoring(&mut self, name: &str);

    /// Broadcasts a scan completion for `name`.
    fn broadcast_scan_event(&mut self, name: &str, event: ScanEvent);
}

/// Caller-supplied sink for one interface's lifecycle.
pub trait InterfaceCallback: Send {
    /// The interface became operational.
    fn on_up(&self, name: &str);

    /// The interface stopped being operational.
    fn on_down(&self, name: &str);

    /// The interface is gone; no further callbacks follow.
    fn on_destroyed(&self, name: &str);
}

/// Single listener for aggregate readiness.
pub trait StatusListener: Send {
    /// Aggregate readiness changed.
    fn on_status_changed(&self, ready: bool);
}

/// Listener for regulatory country code changes.
pub trait CountryCodeListener: Send {
    /// The kernel reported a new country code.
    fn on_country_code_changed(&self, country_code: &str);
}
