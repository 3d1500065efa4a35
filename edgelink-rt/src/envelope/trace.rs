//! Trace propagation headers.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Reserved header key for the runtime's own trace id.
pub const HEADER_TRACE_ID: &str = "trace-id";

/// Reserved header key for W3C traceparent pass-through.
pub const HEADER_TRACEPARENT: &str = "traceparent";

/// Reserved header key for W3C tracestate pass-through.
pub const HEADER_TRACESTATE: &str = "tracestate";

/// Trace identifiers stamped into envelope headers.
///
/// The runtime does not interpret these values; it only propagates them
/// so an external tracing system can stitch calls together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// Runtime trace id
    pub trace_id: Option<String>,

    /// W3C traceparent value
    pub traceparent: Option<String>,

    /// W3C tracestate value
    pub tracestate: Option<String>,
}

impl TraceContext {
    /// A context carrying no trace identifiers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A context with a freshly generated trace id.
    pub fn generate() -> Self {
        Self {
            trace_id: Some(Uuid::new_v4().simple().to_string()),
            traceparent: None,
            tracestate: None,
        }
    }

    /// Extract trace identifiers from envelope headers.
    pub fn from_headers(headers: &HashMap<String, String>) -> Self {
        Self {
            trace_id: headers.get(HEADER_TRACE_ID).cloned(),
            traceparent: headers.get(HEADER_TRACEPARENT).cloned(),
            tracestate: headers.get(HEADER_TRACESTATE).cloned(),
        }
    }

    /// Stamp the carried identifiers into a header map.
    pub fn apply(&self, headers: &mut HashMap<String, String>) {
        if let Some(trace_id) = &self.trace_id {
            headers.insert(HEADER_TRACE_ID.to_string(), trace_id.clone());
        }
        if let Some(traceparent) = &self.traceparent {
            headers.insert(HEADER_TRACEPARENT.to_string(), traceparent.clone());
        }
        if let Some(tracestate) = &self.tracestate {
            headers.insert(HEADER_TRACESTATE.to_string(), tracestate.clone());
        }
    }

    /// Whether no identifiers are carried.
    pub fn is_empty(&self) -> bool {
        self.trace_id.is_none() && self.traceparent.is_none() && self.tracestate.is_none()
    }
}
