//! Writes a dispatched call's outcome back through the transport.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use tracing::error;

// Layer 3: Internal module imports
use super::data::SerializedError;
use super::error::InvocationError;
use crate::envelope::Envelope;
use crate::serialization::{Manifest, SerializationRegistry, WireType};
use crate::transport::Transport;
use crate::util::ActorId;

/// Adapts "method returned / returned void / threw" into Response and
/// Error envelopes.
///
/// Each writer belongs to exactly one dispatched call; the three write
/// operations consume the writer, so exactly one outcome can be
/// reported. The transport write is awaited before the writer returns;
/// a failed write is logged.
pub struct ResponseWriter {
    serialization: Arc<SerializationRegistry>,
    transport: Arc<dyn Transport>,
    reply_to: ActorId,
    sender: Option<ActorId>,
    call_id: String,
}

impl ResponseWriter {
    pub(crate) fn new(
        serialization: Arc<SerializationRegistry>,
        transport: Arc<dyn Transport>,
        reply_to: ActorId,
        sender: Option<ActorId>,
        call_id: String,
    ) -> Self {
        Self {
            serialization,
            transport,
            reply_to,
            sender,
            call_id,
        }
    }

    /// The correlation id this writer answers.
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Report a returned value.
    pub async fn write_success<T: WireType>(self, value: &T) -> Result<(), InvocationError> {
        let (payload, manifest) = self.serialization.serialize(value)?;
        let envelope = Envelope::response(
            self.reply_to.clone(),
            self.sender.clone(),
            self.call_id.clone(),
            manifest,
            payload,
            Default::default(),
        )?;
        self.send_reply(envelope).await
    }

    /// Report a void return: void manifest, empty payload.
    pub async fn write_void(self) -> Result<(), InvocationError> {
        let envelope = Envelope::response(
            self.reply_to.clone(),
            self.sender.clone(),
            self.call_id.clone(),
            Manifest::void(),
            Bytes::new(),
            Default::default(),
        )?;
        self.send_reply(envelope).await
    }

    /// Report a thrown error.
    pub async fn write_error(self, error: SerializedError) -> Result<(), InvocationError> {
        let (payload, manifest) = self.serialization.serialize(&error)?;
        let envelope = Envelope::error(
            self.reply_to.clone(),
            self.sender.clone(),
            self.call_id.clone(),
            manifest,
            payload,
            Default::default(),
        )?;
        self.send_reply(envelope).await
    }

    /// Report an invocation-pipeline failure under its stable wire name.
    pub async fn write_invocation_error(
        self,
        error: &InvocationError,
    ) -> Result<(), InvocationError> {
        let serialized = match error {
            InvocationError::MethodNotFound { target } => SerializedError::method_not_found(target),
            other => SerializedError::new(
                super::data::wire_errors::INVOCATION,
                other.to_string(),
            ),
        };
        self.write_error(serialized).await
    }

    // The write must complete (or be logged) before the handler returns;
    // the dispatcher has nothing further to do with it.
    async fn send_reply(self, envelope: Envelope) -> Result<(), InvocationError> {
        if let Err(e) = self.transport.send(envelope).await {
            error!(call_id = %self.call_id, error = %e, "failed to write call result");
        }
        Ok(())
    }
}
