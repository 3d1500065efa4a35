//! Serialization-layer error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors produced by the serialization layer.
///
/// Variants carry string detail rather than source errors so values stay
/// `Clone` for fan-out to multiple in-flight calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// No registered serializer accepts the value's type
    #[error("no registered serializer accepts type '{type_hint}'")]
    UnsupportedType { type_hint: String },

    /// The manifest names a serializer id that is not registered
    #[error("serializer '{serializer_id}' is not registered")]
    UnknownManifest { serializer_id: String },

    /// The manifest's type hint cannot be resolved locally
    #[error("type hint '{hint}' cannot be resolved locally")]
    UnknownType { hint: String },

    /// The serializer requires a type hint but the manifest carries none
    #[error("manifest for serializer '{serializer_id}' requires a type hint")]
    MissingTypeHint { serializer_id: String },

    /// Value could not be encoded by its codec
    #[error("failed to encode '{type_hint}': {detail}")]
    Encode { type_hint: String, detail: String },

    /// Payload bytes could not be decoded by the named codec
    #[error("corrupt payload for '{type_hint}': {detail}")]
    Corrupt { type_hint: String, detail: String },
}
