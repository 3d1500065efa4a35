//! The unified runtime error taxonomy.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::envelope::EnvelopeError;
use crate::invocation::data::{wire_errors, SerializedError};
use crate::invocation::InvocationError;
use crate::serialization::SerializationError;
use crate::transport::TransportError;
use crate::util::ActorId;

/// Every failure a remote call or dispatch can surface.
///
/// Per-subsystem errors convert in via `#[from]`; the variants added
/// here cover the cross-cutting call outcomes. Values are `Clone` so a
/// single cancellation reason can fan out to many in-flight calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Recipient id unknown on the server
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// Resolved local actor is of an incompatible type
    #[error("local actor '{id}' has type {actual}, expected {expected}")]
    TypeMismatch {
        id: ActorId,
        expected: String,
        actual: String,
    },

    /// Per-call timeout expired
    #[error("call '{call_id}' timed out")]
    Timeout { call_id: String },

    /// Caller-side task cancellation
    #[error("call was cancelled")]
    Cancelled,

    /// Call rejected because the lifecycle manager is draining or
    /// terminated
    #[error("system is draining or shut down")]
    SystemShutDown,

    /// The peer answered outside the call contract
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// User-domain error thrown by the server-side method
    #[error("remote error '{}': {}", .0.type_name, .0.message)]
    Remote(SerializedError),

    /// Serialization-layer failure
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Invocation pipeline failure
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Transport-reported failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Envelope construction or codec failure
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl RpcError {
    /// Map a wire-carried failure back to a typed error.
    ///
    /// Runtime failures travel under stable names and reconstruct the
    /// matching variant; anything else stays a [`RpcError::Remote`] for
    /// the caller to decode via the type registry.
    pub(crate) fn from_wire_error(
        error: SerializedError,
        recipient: &ActorId,
        target: &str,
    ) -> Self {
        match error.type_name.as_str() {
            wire_errors::ACTOR_NOT_FOUND => Self::ActorNotFound(recipient.clone()),
            wire_errors::METHOD_NOT_FOUND => Self::Invocation(InvocationError::MethodNotFound {
                target: target.to_string(),
            }),
            _ => Self::Remote(error),
        }
    }

    /// The carried remote error, when this is one.
    pub fn as_remote(&self) -> Option<&SerializedError> {
        match self {
            Self::Remote(error) => Some(error),
            _ => None,
        }
    }

    /// Whether a retry at a higher layer could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport(TransportError::SendFailed(_))
        )
    }

    /// Whether the owning system can no longer issue calls.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SystemShutDown | Self::Transport(TransportError::Disconnected)
        )
    }
}
