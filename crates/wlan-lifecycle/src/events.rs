//! Events posted by subsystem callbacks and the handles that post them.
//!
//! Subsystems never call back into the coordinator directly. Every handle in
//! this module only enqueues an [`Event`]; the coordinator drains the queue
//! on its own serial context. An optional waker lets a hosting dispatch loop
//! learn that new events are waiting.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use once_cell::sync::OnceCell;

use crate::subsystem::SubsystemKind;

/// Identity of a destruction listener, minted once per created interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Identity of a link observer, minted once per registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Debug, Default)]
pub(crate) struct TokenMinter {
    next: u64,
}

impl TokenMinter {
    const fn bump(&mut self) -> u64 {
        self.next = self.next.wrapping_add(1);
        self.next
    }

    pub(crate) const fn listener(&mut self) -> ListenerId {
        ListenerId(self.bump())
    }

    pub(crate) const fn observer(&mut self) -> ObserverId {
        ObserverId(self.bump())
    }
}

/// Radio concurrency modes reported by the resource layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioMode {
    /// Multi-channel concurrency.
    Mcc,
    /// Single-channel concurrency.
    Scc,
    /// Single-band simultaneous operation.
    Sbs,
    /// Dual-band simultaneous operation.
    Dbs,
}

/// Scan completions delivered by the kernel control layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanEvent {
    /// Single-shot scan results are ready.
    ResultsReady,
    /// A single-shot scan failed.
    Failed,
    /// A preferred-network-offload scan found a network.
    PnoNetworkFound,
    /// A preferred-network-offload scan failed.
    PnoScanFailed,
}

/// Work items processed on the coordinator's serial context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The resource layer released the radio resource behind an interface.
    InterfaceDestroyed {
        /// Listener registered when the interface was created.
        listener: ListenerId,
        /// Interface name reported by the resource layer.
        name: String,
    },
    /// A subsystem process died.
    SubsystemDied(SubsystemKind),
    /// Operational state of an interface changed.
    InterfaceStateChanged {
        /// Observer that saw the change.
        observer: ObserverId,
        /// Interface the observer reports on.
        name: String,
        /// Reported state; re-queried before use.
        up: bool,
    },
    /// Link-layer-only state changed. Diagnostics only.
    LinkStateChanged {
        /// Observer that saw the change.
        observer: ObserverId,
        /// Interface the observer reports on.
        name: String,
        /// Reported link state.
        up: bool,
    },
    /// Scan or PNO completion for a station interface.
    Scan {
        /// Interface the scan ran on.
        name: String,
        /// What completed.
        event: ScanEvent,
    },
    /// The resource layer switched radio concurrency mode.
    RadioModeChanged(RadioMode),
    /// The regulatory country code changed.
    CountryCodeChanged(String),
}

/// Callback used to nudge a dispatch loop when an event is posted.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Cloneable posting side of the coordinator's event queue.
#[derive(Clone)]
pub struct EventPoster {
    sender: Sender<Event>,
    waker: Arc<OnceCell<Waker>>,
}

impl fmt::Debug for EventPoster {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventPoster")
            .field("waker_installed", &self.waker.get().is_some())
            .finish_non_exhaustive()
    }
}

impl EventPoster {
    /// Enqueues `event`. Events posted after the coordinator is dropped are
    /// discarded.
    pub fn post(&self, event: Event) {
        if self.sender.send(event).is_err() {
            tracing::debug!(
                target: "wlan_lifecycle::events",
                "event queue closed; dropping event"
            );
            return;
        }
        if let Some(waker) = self.waker.get() {
            waker();
        }
    }
}

pub(crate) struct EventQueue {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    waker: Arc<OnceCell<Waker>>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            waker: Arc::new(OnceCell::new()),
        }
    }

    pub(crate) fn poster(&self) -> EventPoster {
        EventPoster {
            sender: self.sender.clone(),
            waker: Arc::clone(&self.waker),
        }
    }

    /// Installs the waker; returns `false` if one was already installed.
    pub(crate) fn install_waker(&self, waker: Waker) -> bool {
        self.waker.set(waker).is_ok()
    }

    pub(crate) fn try_next(&self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

/// One-shot capability handed to the resource layer at interface creation.
#[derive(Debug, Clone)]
pub struct DestructionListener {
    id: ListenerId,
    poster: EventPoster,
}

impl DestructionListener {
    pub(crate) const fn new(id: ListenerId, poster: EventPoster) -> Self {
        Self { id, poster }
    }

    /// Returns the listener identity.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Signals that the radio resource behind `name` is gone.
    pub fn interface_destroyed(&self, name: &str) {
        self.poster.post(Event::InterfaceDestroyed {
            listener: self.id,
            name: name.to_owned(),
        });
    }
}

/// Observer registered with the link facility for one interface name.
#[derive(Debug, Clone)]
pub struct LinkObserver {
    id: ObserverId,
    interface: String,
    poster: EventPoster,
}

impl LinkObserver {
    pub(crate) fn new(id: ObserverId, interface: &str, poster: EventPoster) -> Self {
        Self {
            id,
            interface: interface.to_owned(),
            poster,
        }
    }

    /// Returns the observer identity.
    #[must_use]
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Returns the interface name the observer was bound to.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Reports an interface up/down transition.
    pub fn interface_state_changed(&self, name: &str, up: bool) {
        self.poster.post(Event::InterfaceStateChanged {
            observer: self.id,
            name: name.to_owned(),
            up,
        });
    }

    /// Reports a link-layer-only transition.
    pub fn link_state_changed(&self, name: &str, up: bool) {
        self.poster.post(Event::LinkStateChanged {
            observer: self.id,
            name: name.to_owned(),
            up,
        });
    }
}

/// Death handler registered with a subsystem.
#[derive(Debug, Clone)]
pub struct DeathNotifier {
    subsystem: SubsystemKind,
    poster: EventPoster,
}

impl DeathNotifier {
    pub(crate) const fn new(subsystem: SubsystemKind, poster: EventPoster) -> Self {
        Self { subsystem, poster }
    }

    /// Returns the subsystem this handler watches.
    #[must_use]
    pub const fn subsystem(&self) -> SubsystemKind {
        self.subsystem
    }

    /// Reports that the watched subsystem died.
    pub fn subsystem_died(&self) {
        self.poster.post(Event::SubsystemDied(self.subsystem));
    }
}

/// Scan completion sink bound to a client-mode interface.
#[derive(Debug, Clone)]
pub struct ScanEventNotifier {
    interface: String,
    poster: EventPoster,
}

impl ScanEventNotifier {
    pub(crate) fn new(interface: &str, poster: EventPoster) -> Self {
        Self {
            interface: interface.to_owned(),
            poster,
        }
    }

    /// Returns the interface the notifier reports for.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Reports a scan completion.
    pub fn notify(&self, event: ScanEvent) {
        self.poster.post(Event::Scan {
            name: self.interface.clone(),
            event,
        });
    }
}

/// Radio mode change sink registered with the resource layer.
#[derive(Debug, Clone)]
pub struct RadioModeNotifier {
    poster: EventPoster,
}

impl RadioModeNotifier {
    pub(crate) const fn new(poster: EventPoster) -> Self {
        Self { poster }
    }

    /// Reports the new radio mode.
    pub fn radio_mode_changed(&self, mode: RadioMode) {
        self.poster.post(Event::RadioModeChanged(mode));
    }
}

/// Country code change sink registered with the kernel control layer.
#[derive(Debug, Clone)]
pub struct CountryCodeNotifier {
    poster: EventPoster,
}

impl CountryCodeNotifier {
    pub(crate) const fn new(poster: EventPoster) -> Self {
        Self { poster }
    }

    /// Reports the new country code.
    pub fn country_code_changed(&self, country_code: &str) {
        self.poster.post(Event::CountryCodeChanged(country_code.to_owned()));
    }
}
