//! Wire payload types for Invocation and Response/Error envelopes.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::serialization::{Manifest, TypeRegistry, WireType};
use crate::util::ActorId;

/// Stable wire names for runtime-originated failures.
///
/// A server reports its own failures (as opposed to user-thrown domain
/// errors) under these type names so the client can map them back to
/// typed errors without a registered domain type.
pub mod wire_errors {
    /// Recipient id unknown on the server
    pub const ACTOR_NOT_FOUND: &str = "edgelink::actor-not-found";
    /// Target does not resolve to a dispatchable method
    pub const METHOD_NOT_FOUND: &str = "edgelink::method-not-found";
    /// Decoder discrepancy while unpacking the invocation
    pub const INVOCATION: &str = "edgelink::invocation";
    /// Serialization failure while packing the result
    pub const SERIALIZATION: &str = "edgelink::serialization";
    /// Uncategorized server-side failure
    pub const INTERNAL: &str = "edgelink::internal";
}

/// One positional argument: payload bytes plus the manifest that decodes
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationArgument {
    /// Encoded argument value
    pub data: Vec<u8>,

    /// Manifest describing the encoding
    pub manifest: Manifest,
}

/// The structured payload of an Invocation envelope.
///
/// Argument order is positional and meaningful; generic substitutions are
/// positional with respect to the target method's declared generic
/// parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationData {
    /// Encoded arguments in parameter order
    pub arguments: Vec<InvocationArgument>,

    /// Type hints for generic parameters, in declaration order
    pub generic_substitutions: Vec<String>,

    /// Whether the target method returns void
    pub is_void: bool,
}

impl WireType for InvocationData {
    const WIRE_NAME: &'static str = "InvocationData";
    const QUALIFIED_NAME: &'static str = "edgelink_rt::invocation::InvocationData";
}

/// A server-side failure serialized for the wire.
///
/// Domain errors keep their registered wire name and optional encoded
/// value so the client can recover the concrete type; runtime failures
/// use the stable [`wire_errors`] names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedError {
    /// Wire name of the error type
    pub type_name: String,

    /// Human-readable failure description
    pub message: String,

    /// Encoded error value, when the type is codable
    pub data: Option<Vec<u8>>,
}

impl SerializedError {
    /// A serialized error with no codable payload.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Capture a user-domain error, keeping its encoded value when the
    /// codec accepts it.
    pub fn capture<E>(error: &E) -> Self
    where
        E: WireType + std::fmt::Display,
    {
        Self {
            type_name: E::WIRE_NAME.to_string(),
            message: error.to_string(),
            data: error.encode_wire().ok(),
        }
    }

    /// Runtime failure: unknown recipient actor.
    pub fn actor_not_found(id: &ActorId) -> Self {
        Self::new(
            wire_errors::ACTOR_NOT_FOUND,
            format!("no actor registered under id '{id}'"),
        )
    }

    /// Runtime failure: unknown target method.
    pub fn method_not_found(target: &str) -> Self {
        Self::new(
            wire_errors::METHOD_NOT_FOUND,
            format!("target '{target}' does not resolve to a dispatchable method"),
        )
    }

    /// Attempt typed recovery of the original error value.
    ///
    /// Succeeds only when the wire name resolves through the
    /// [`TypeRegistry`] to `E` and the codable bytes decode.
    pub fn try_decode<E: WireType>(&self) -> Option<E> {
        let data = self.data.as_deref()?;
        let descriptor = TypeRegistry::global().resolve(&self.type_name)?;
        if descriptor.wire_name != E::WIRE_NAME {
            return None;
        }
        E::decode_wire(data).ok()
    }
}

impl WireType for SerializedError {
    const WIRE_NAME: &'static str = "SerializedError";
    const QUALIFIED_NAME: &'static str = "edgelink_rt::invocation::SerializedError";
}

/// The outcome carried by a Response or Error envelope.
///
/// On the wire the tag lives on the envelope itself: a Response with a
/// value manifest is `Success`, a Response with the void manifest and an
/// empty payload is `Void`, and an Error envelope carries an encoded
/// [`SerializedError`]. The
/// [`InvocationProcessor`](super::InvocationProcessor) maps between the
/// two representations.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    /// The method returned a value
    Success {
        /// Manifest describing the encoded return value
        manifest: Manifest,
        /// Encoded return value
        data: Vec<u8>,
    },

    /// The method returned void
    Void,

    /// The method threw
    Error(SerializedError),
}
