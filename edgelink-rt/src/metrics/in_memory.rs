//! Queryable in-memory metrics sink.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::traits::MetricsSink;

/// Sink keeping all recordings in memory for later inspection.
///
/// Intended for tests and local diagnostics; production deployments
/// adapt their metrics backend behind [`MetricsSink`] instead.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: DashMap<String, u64>,
    gauges: DashMap<String, u64>,
    histograms: DashMap<String, Mutex<Vec<f64>>>,
}

impl InMemoryMetrics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value; zero when never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).map(|v| *v).unwrap_or(0)
    }

    /// Last recorded gauge value.
    pub fn gauge(&self, name: &str) -> Option<u64> {
        self.gauges.get(name).map(|v| *v)
    }

    /// All samples recorded under a histogram name.
    pub fn histogram(&self, name: &str) -> Vec<f64> {
        self.histograms
            .get(name)
            .map(|samples| samples.lock().clone())
            .unwrap_or_default()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment_counter(&self, name: &str, delta: u64) {
        *self.counters.entry(name.to_string()).or_insert(0) += delta;
    }

    fn record_gauge(&self, name: &str, value: u64) {
        self.gauges.insert(name.to_string(), value);
    }

    fn record_histogram(&self, name: &str, value_ms: f64) {
        self.histograms
            .entry(name.to_string())
            .or_default()
            .lock()
            .push(value_ms);
    }
}
