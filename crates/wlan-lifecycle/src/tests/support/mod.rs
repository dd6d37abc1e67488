//! Test harness utilities for the coordinator suites.

mod daemon;
mod kernel;
mod link;
mod sinks;
#[path = "world.rs"]
mod world_fixture;

pub use daemon::RecordingDaemon;
pub use kernel::RecordingKernel;
pub use link::{RecordingLink, RecordingMonitor};
pub use log::{Call, CallLog, CallbackEvent, DaemonCall};
pub use resource::RecordingResourceLayer;
pub use sinks::{
    RecordingCallback, RecordingCountryCodeListener, RecordingMetrics, RecordingReporter,
    RecordingStatusListener, ReportEvent,
};
pub use world_fixture::{TestWorld, access_point_request, work_source, world};
