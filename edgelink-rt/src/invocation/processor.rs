//! Stateless composition of encoder/decoder, serialization, and
//! envelope construction.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::data::{InvocationData, InvocationResult, SerializedError};
use super::decoder::InvocationDecoder;
use super::encoder::InvocationEncoder;
use super::error::InvocationError;
use super::result_handler::ResponseWriter;
use crate::envelope::{Envelope, MessageType, TraceContext};
use crate::serialization::{SerializationRegistry, SerializerId};
use crate::transport::Transport;
use crate::util::{ActorId, CallId};

/// Orchestrates the invocation pipeline around one serialization
/// registry. The processor holds no per-call state; every operation is a
/// pure composition.
#[derive(Clone)]
pub struct InvocationProcessor {
    serialization: Arc<SerializationRegistry>,
}

impl InvocationProcessor {
    /// A processor bound to the given serialization registry.
    pub fn new(serialization: Arc<SerializationRegistry>) -> Self {
        Self { serialization }
    }

    /// A fresh encoder bound to this processor's serialization.
    pub fn encoder(&self) -> InvocationEncoder {
        InvocationEncoder::new(Arc::clone(&self.serialization))
    }

    /// Drain an encoder into an Invocation envelope with a fresh call id
    /// and trace headers stamped from `trace`.
    pub fn create_invocation_envelope(
        &self,
        recipient: ActorId,
        sender: Option<ActorId>,
        target: &str,
        encoder: &mut InvocationEncoder,
        trace: &TraceContext,
    ) -> Result<Envelope, InvocationError> {
        let data = encoder.finalize()?;
        let (payload, manifest) = self.serialization.serialize(&data)?;

        let mut headers = HashMap::new();
        trace.apply(&mut headers);

        Ok(Envelope::invocation(
            recipient,
            sender,
            target,
            CallId::generate().into_string(),
            manifest,
            payload,
            headers,
        )?)
    }

    /// Decode an Invocation envelope's payload into a decoder bound to
    /// this processor's serialization.
    pub fn create_invocation_decoder(
        &self,
        envelope: &Envelope,
    ) -> Result<InvocationDecoder, InvocationError> {
        let data: InvocationData = self
            .serialization
            .deserialize(envelope.payload(), envelope.manifest())?;
        Ok(InvocationDecoder::new(Arc::clone(&self.serialization), data))
    }

    /// Extract the result carried by a Response or Error envelope.
    ///
    /// The tagged union is encoded on the envelope itself: a Response
    /// with the void manifest and an empty payload is `Void`, any other
    /// Response is `Success` with the envelope's manifest and payload,
    /// and an Error envelope carries an encoded [`SerializedError`].
    pub fn extract_result(&self, envelope: &Envelope) -> Result<InvocationResult, InvocationError> {
        match envelope.message_type() {
            MessageType::Response => {
                if envelope.manifest().serializer_id == SerializerId::void() {
                    Ok(InvocationResult::Void)
                } else {
                    Ok(InvocationResult::Success {
                        manifest: envelope.manifest().clone(),
                        data: envelope.payload().to_vec(),
                    })
                }
            }
            MessageType::Error => {
                let error: SerializedError = self
                    .serialization
                    .deserialize(envelope.payload(), envelope.manifest())?;
                Ok(InvocationResult::Error(error))
            }
            other => Err(InvocationError::Envelope(
                crate::envelope::EnvelopeError::Decode(format!(
                    "cannot extract a call result from a {other:?} envelope"
                )),
            )),
        }
    }

    /// Capture the correlation identifiers of a request envelope so the
    /// dispatched method's outcome can be written back later.
    ///
    /// The reply is addressed to the request's sender when stamped,
    /// falling back to the invoked actor itself; correlation on the far
    /// side is by call id either way.
    pub fn create_response_writer(
        &self,
        request: &Envelope,
        transport: Arc<dyn Transport>,
    ) -> ResponseWriter {
        let reply_to = request
            .sender()
            .cloned()
            .unwrap_or_else(|| request.recipient().clone());
        ResponseWriter::new(
            Arc::clone(&self.serialization),
            transport,
            reply_to,
            Some(request.recipient().clone()),
            request.call_id().to_string(),
        )
    }

    /// Build an Error envelope carrying a serialized failure.
    pub fn create_error_envelope(
        &self,
        to: ActorId,
        correlation_id: &str,
        error: SerializedError,
        sender: Option<ActorId>,
    ) -> Result<Envelope, InvocationError> {
        let (payload, manifest) = self.serialization.serialize(&error)?;
        Ok(Envelope::error(
            to,
            sender,
            correlation_id,
            manifest,
            payload,
            HashMap::new(),
        )?)
    }
}
