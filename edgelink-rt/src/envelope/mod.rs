//! The addressed, metadata-stamped carrier for all wire messages.
//!
//! Every message between peers is an [`Envelope`]: recipient, optional
//! sender, payload manifest, payload bytes, call metadata, and a message
//! type discriminator. Envelopes are immutable value objects with a
//! canonical CBOR wire representation.

pub mod error;
pub mod metadata;
pub mod trace;
pub mod wire;

// Re-export commonly used types
pub use error::EnvelopeError;
pub use metadata::Metadata;
pub use trace::TraceContext;
pub use wire::{Envelope, MessageType};
