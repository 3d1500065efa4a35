//! The envelope value object and its canonical wire form.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::EnvelopeError;
use super::metadata::Metadata;
use crate::serialization::Manifest;
use crate::util::ActorId;

/// Discriminates the four envelope kinds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    /// A method invocation flowing client to server
    Invocation,
    /// A successful (or void) result flowing back
    Response,
    /// A failure result flowing back
    Error,
    /// Reserved for runtime control traffic
    System,
}

/// The unit of wire transfer.
///
/// An envelope is immutable after construction; the four factories
/// enforce the per-kind invariants (non-empty call id for
/// Invocation/Response/Error, non-empty target for Invocation) and stamp
/// the metadata timestamp.
///
/// The canonical binary representation is CBOR; [`Envelope::to_wire`] and
/// [`Envelope::from_wire`] round-trip every field exactly, including the
/// header map and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    recipient: ActorId,
    sender: Option<ActorId>,
    manifest: Manifest,
    payload: Bytes,
    metadata: Metadata,
    message_type: MessageType,
}

impl Envelope {
    /// Build an Invocation envelope.
    pub fn invocation(
        recipient: ActorId,
        sender: Option<ActorId>,
        target: impl Into<String>,
        call_id: impl Into<String>,
        manifest: Manifest,
        payload: Bytes,
        headers: HashMap<String, String>,
    ) -> Result<Self, EnvelopeError> {
        let call_id = call_id.into();
        let target = target.into();
        if call_id.is_empty() {
            return Err(EnvelopeError::EmptyCallId);
        }
        if target.is_empty() {
            return Err(EnvelopeError::EmptyTarget);
        }
        Ok(Self {
            recipient,
            sender,
            manifest,
            payload,
            metadata: Metadata::new(call_id, target, headers),
            message_type: MessageType::Invocation,
        })
    }

    /// Build a Response envelope correlated to `call_id`.
    pub fn response(
        recipient: ActorId,
        sender: Option<ActorId>,
        call_id: impl Into<String>,
        manifest: Manifest,
        payload: Bytes,
        headers: HashMap<String, String>,
    ) -> Result<Self, EnvelopeError> {
        Self::reply(
            recipient,
            sender,
            call_id,
            manifest,
            payload,
            headers,
            MessageType::Response,
        )
    }

    /// Build an Error envelope correlated to `call_id`.
    pub fn error(
        recipient: ActorId,
        sender: Option<ActorId>,
        call_id: impl Into<String>,
        manifest: Manifest,
        payload: Bytes,
        headers: HashMap<String, String>,
    ) -> Result<Self, EnvelopeError> {
        Self::reply(
            recipient,
            sender,
            call_id,
            manifest,
            payload,
            headers,
            MessageType::Error,
        )
    }

    /// Build a System envelope. Reserved; carries no call correlation.
    pub fn system(
        recipient: ActorId,
        sender: Option<ActorId>,
        manifest: Manifest,
        payload: Bytes,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            recipient,
            sender,
            manifest,
            payload,
            metadata: Metadata::new("", "", headers),
            message_type: MessageType::System,
        }
    }

    fn reply(
        recipient: ActorId,
        sender: Option<ActorId>,
        call_id: impl Into<String>,
        manifest: Manifest,
        payload: Bytes,
        headers: HashMap<String, String>,
        message_type: MessageType,
    ) -> Result<Self, EnvelopeError> {
        let call_id = call_id.into();
        if call_id.is_empty() {
            return Err(EnvelopeError::EmptyCallId);
        }
        Ok(Self {
            recipient,
            sender,
            manifest,
            payload,
            metadata: Metadata::new(call_id, "", headers),
            message_type,
        })
    }

    /// The addressed recipient.
    pub fn recipient(&self) -> &ActorId {
        &self.recipient
    }

    /// The originating sender, if stamped.
    pub fn sender(&self) -> Option<&ActorId> {
        self.sender.as_ref()
    }

    /// Manifest describing the payload.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The payload bytes; cheap to clone.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Call metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Envelope kind.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Correlation id shortcut.
    pub fn call_id(&self) -> &str {
        &self.metadata.call_id
    }

    /// Target method shortcut.
    pub fn target(&self) -> &str {
        &self.metadata.target
    }

    /// Encode to the canonical binary representation.
    pub fn to_wire(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_cbor::to_vec(self).map_err(|e| EnvelopeError::Encode(e.to_string()))
    }

    /// Decode from the canonical binary representation.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        serde_cbor::from_slice(bytes).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }
}
