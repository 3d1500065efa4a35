//! Envelope construction and wire codec errors.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors from envelope construction or the canonical wire codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Invocation, Response, and Error envelopes need a call id
    #[error("envelope call id must not be empty")]
    EmptyCallId,

    /// Invocation envelopes need a target method identifier
    #[error("invocation target must not be empty")]
    EmptyTarget,

    /// Canonical binary encoding failed
    #[error("failed to encode envelope: {0}")]
    Encode(String),

    /// Canonical binary decoding failed
    #[error("failed to decode envelope: {0}")]
    Decode(String),
}
