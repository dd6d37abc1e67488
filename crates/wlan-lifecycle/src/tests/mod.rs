//! Tests for the lifecycle coordinator.

mod support;
