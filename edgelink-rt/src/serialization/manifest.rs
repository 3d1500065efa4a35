//! Serializer identifiers and the wire manifest.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Identifies the codec that produced a payload.
///
/// Built-in ids are `json`, `specialized-with-type-hint`, and `void`;
/// applications may introduce custom ids as long as both peers register
/// the codec under the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializerId(String);

impl SerializerId {
    /// The general-purpose JSON codec.
    pub fn json() -> Self {
        Self("json".to_string())
    }

    /// The little-endian primitive codec dispatched by type hint.
    pub fn specialized() -> Self {
        Self("specialized-with-type-hint".to_string())
    }

    /// The empty-payload codec for void returns.
    pub fn void() -> Self {
        Self("void".to_string())
    }

    /// A custom application-defined serializer id.
    pub fn custom(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SerializerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tells the receiving peer how to decode a payload.
///
/// The `type_hint` carries the wire name of the encoded type so the
/// receiver can resolve the concrete type through the
/// [`TypeRegistry`](super::TypeRegistry). An absent hint is only valid
/// for serializers that need no dynamic dispatch (the void codec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Id of the codec that produced the payload
    pub serializer_id: SerializerId,

    /// Wire name of the encoded type, if the codec needs one
    pub type_hint: Option<String>,
}

impl Manifest {
    /// Create a manifest for the given serializer and optional hint.
    pub fn new(serializer_id: SerializerId, type_hint: Option<String>) -> Self {
        Self {
            serializer_id,
            type_hint,
        }
    }

    /// Manifest for the void codec: no hint, empty payload.
    pub fn void() -> Self {
        Self {
            serializer_id: SerializerId::void(),
            type_hint: None,
        }
    }

    /// The hint as a borrowed str, if present.
    pub fn hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }
}
