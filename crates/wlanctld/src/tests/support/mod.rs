//! Test harness utilities for the lifecycle service.

mod reporter;
mod world;

pub use mocks::Notification;
pub use reporter::HealthEvent;
pub use subsystems::subsystems;
pub use world::{TestWorld, running, test_config, work_source};
