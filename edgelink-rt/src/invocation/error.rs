//! Invocation pipeline error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::envelope::EnvelopeError;
use crate::serialization::SerializationError;

/// Errors from encoding, decoding, or dispatching an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// Encoder operation attempted outside the accepting state
    #[error("encoder operation invalid in state {state}")]
    InvalidEncoderState { state: String },

    /// Argument requested past the end of the decoded sequence
    #[error("no argument at position {index}")]
    ArgumentMissing { index: usize },

    /// Argument bytes could not be decoded into the declared type
    #[error("failed to decode argument {index}: {detail}")]
    ArgumentDecodeFailed { index: usize, detail: String },

    /// Decoded argument count disagrees with the method arity
    #[error("method takes {expected} arguments, invocation carries {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// Target identifier does not resolve to a dispatchable method
    #[error("target '{target}' does not resolve to a dispatchable method")]
    MethodNotFound { target: String },

    /// Serialization-layer failure
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Envelope construction failure
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}
