//! Zero-overhead metrics sink.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::traits::MetricsSink;

/// A sink that discards every recording.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    /// Create a no-op sink.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NoopMetrics {
    fn increment_counter(&self, _name: &str, _delta: u64) {}

    fn record_gauge(&self, _name: &str, _value: u64) {}

    fn record_histogram(&self, _name: &str, _value_ms: f64) {}
}
