//! Transport-layer error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors reported by transport implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport is closed or the peer is lost
    #[error("transport is disconnected")]
    Disconnected,

    /// The write itself failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The peer spoke something that is not this protocol
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// The connection URL could not be used
    #[error("invalid transport url: {0}")]
    InvalidUrl(String),

    /// Dialing the peer failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS was requested but the embedded stack cannot provide it.
    /// Construction fails loudly rather than downgrading to plaintext.
    #[error("TLS requested but not supported by the embedded stack: {0}")]
    TlsUnsupported(String),

    /// The ingress stream was already handed to a consumer
    #[error("ingress stream already claimed")]
    IngressClaimed,
}
