//! Forwarding of coordinator counters to the `metrics` facade.

use wlan_lifecycle::{Counter, MetricsSink};

/// Sink that increments a facade counter named after each [`Counter`].
///
/// Counters land in whichever recorder the host installed; without one the
/// increments are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeMetricsSink;

impl FacadeMetricsSink {
    /// Builds a new sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MetricsSink for FacadeMetricsSink {
    fn increment(&self, counter: Counter) {
        metrics::counter!(counter.metric_name()).increment(1);
    }
}
