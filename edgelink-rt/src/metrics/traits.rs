//! The metrics sink seam and well-known metric names.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Well-known metric names, namespaced at record time.
pub mod names {
    /// Gauge: calls currently in flight
    pub const IN_FLIGHT: &str = "rpc.calls.in_flight";

    /// Counter: calls resolved by timeout
    pub const TIMEOUTS: &str = "rpc.calls.timeouts";

    /// Histogram: call latency in milliseconds
    pub const CALL_LATENCY_MS: &str = "rpc.calls.latency_ms";

    /// Histogram: drain duration in milliseconds
    pub const DRAIN_DURATION_MS: &str = "rpc.drain.duration_ms";
}

/// Join a configured namespace with a metric name.
pub fn namespaced(namespace: &str, name: &str) -> String {
    format!("{namespace}.{name}")
}

/// Recording surface for runtime metrics.
///
/// Implementations must be cheap and non-blocking; the runtime records
/// on hot paths while holding short-lived locks.
pub trait MetricsSink: Send + Sync + 'static {
    /// Add to a monotonic counter.
    fn increment_counter(&self, name: &str, delta: u64);

    /// Set a gauge to its current value.
    fn record_gauge(&self, name: &str, value: u64);

    /// Record one histogram sample, in milliseconds.
    fn record_histogram(&self, name: &str, value_ms: f64);
}
