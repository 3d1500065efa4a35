//! Metrics behind an interface.
//!
//! The runtime records counters, gauges, and histograms through the
//! [`MetricsSink`] seam; the backend choice stays outside the core.
//! [`InMemoryMetrics`] keeps queryable values for tests and local
//! inspection, [`NoopMetrics`] compiles the recording away.

pub mod in_memory;
pub mod noop;
pub mod traits;

// Re-export commonly used types
pub use in_memory::InMemoryMetrics;
pub use noop::NoopMetrics;
pub use traits::{names, namespaced, MetricsSink};
