//! The transport seam.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedReceiver;

// Layer 3: Internal module imports
use super::error::TransportError;
use crate::envelope::Envelope;

/// Introspection data for a transport instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMetadata {
    /// URL scheme or transport family ("grpc", "inmem")
    pub scheme: String,

    /// Peer description ("host:port" or a pair label)
    pub peer: String,

    /// When the transport was constructed
    pub connected_at: DateTime<Utc>,
}

impl TransportMetadata {
    /// Metadata stamped with the current time.
    pub fn new(scheme: impl Into<String>, peer: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            peer: peer.into(),
            connected_at: Utc::now(),
        }
    }
}

/// Moves envelopes between two peers.
///
/// Implementations fall into two styles. Synchronous-response transports
/// resolve `send` with the correlated response envelope directly;
/// asynchronous transports return `None` from `send` and surface all
/// inbound envelopes (responses included) through [`receive`](Self::receive),
/// leaving correlation to the call lifecycle manager.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one envelope.
    ///
    /// Returns the correlated response envelope for request/response
    /// style transports, `None` for fire-and-forget style.
    ///
    /// # Errors
    ///
    /// `Disconnected` after [`close`](Self::close) or on peer loss;
    /// `SendFailed` when the write fails; `ProtocolMismatch` when the
    /// peer cannot accept the envelope.
    async fn send(&self, envelope: Envelope) -> Result<Option<Envelope>, TransportError>;

    /// Claim the inbound envelope stream.
    ///
    /// The stream ends when the transport closes. Each envelope yielded
    /// is owned by the consumer. The stream can be claimed once;
    /// subsequent calls fail `IngressClaimed`.
    async fn receive(&self) -> Result<UnboundedReceiver<Envelope>, TransportError>;

    /// Close the transport. Idempotent; subsequent sends fail
    /// `Disconnected`.
    async fn close(&self) -> Result<(), TransportError>;

    /// Whether the transport can currently move envelopes.
    fn is_connected(&self) -> bool;

    /// Introspection data.
    fn metadata(&self) -> TransportMetadata;
}
