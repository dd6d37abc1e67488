//! Service host for the wireless interface lifecycle coordinator.
//!
//! The [`wlan_lifecycle::Coordinator`] is a single-threaded state machine.
//! This crate gives it a home: [`bootstrap_with`] loads configuration,
//! installs structured telemetry, initialises the coordinator against the
//! supplied subsystem clients and moves it onto a dedicated dispatch
//! thread. Callers talk to it through a cloneable [`ServiceHandle`], whose
//! blocking methods are queued behind any subsystem events already waiting
//! on the dispatch thread.
//!
//! Subsystem callbacks (death notifications, interface destruction, link
//! state and so on) only enqueue events. Posting an event wakes the
//! dispatch thread, which drains the queue between commands, so no
//! callback ever runs concurrently with a coordinator operation.
//!
//! Counters raised by the coordinator can be forwarded to the `metrics`
//! facade with [`FacadeMetricsSink`].

mod bootstrap;
mod health;
mod service;
mod sink;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, FileConfigLoader, Service, StaticConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use service::{CoordinatorService, ServiceError, ServiceHandle, SpawnError};
pub use sink::FacadeMetricsSink;
pub use telemetry::{TelemetryError, TelemetryHandle};
