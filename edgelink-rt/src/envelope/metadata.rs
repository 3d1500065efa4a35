//! Per-envelope call metadata.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::Utc;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Metadata stamped on every envelope.
///
/// `call_id` correlates a Response or Error envelope back to its
/// originating Invocation; `target` names the method to invoke;
/// `timestamp` is unix milliseconds at construction; `headers` carries
/// free-form transport metadata including trace propagation keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Correlation id, unique per client call
    pub call_id: String,

    /// Method identifier; empty for non-invocation envelopes
    pub target: String,

    /// Unix milliseconds at envelope construction
    pub timestamp: i64,

    /// Free-form headers
    pub headers: HashMap<String, String>,
}

impl Metadata {
    /// Create metadata stamped with the current time.
    pub fn new(
        call_id: impl Into<String>,
        target: impl Into<String>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            target: target.into(),
            timestamp: Utc::now().timestamp_millis(),
            headers,
        }
    }

    /// Read a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}
