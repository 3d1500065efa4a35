//! The [`WireType`] trait and built-in wire type implementations.

// Layer 1: Standard library imports
use std::mem::size_of;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

// Layer 3: Internal module imports
use super::error::SerializationError;
use super::manifest::SerializerId;

/// A type that can travel on the wire.
///
/// Implementors name themselves with a stable wire name (the manifest
/// type hint) and pick the codec that encodes them. The default codec is
/// general-purpose JSON; primitive types override the hooks with the
/// specialized little-endian encoding, which carries no length prefix
/// because the envelope payload length delimits.
///
/// The wire name must reflect the *declared* type at the call site, so
/// the receiver decodes into the method's parameter type rather than a
/// runtime subtype.
pub trait WireType: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable unqualified wire name used as the manifest type hint.
    const WIRE_NAME: &'static str;

    /// Qualified form of the wire name, also registered for resolution.
    const QUALIFIED_NAME: &'static str = Self::WIRE_NAME;

    /// Id of the codec that encodes values of this type.
    fn serializer_id() -> SerializerId {
        SerializerId::json()
    }

    /// Encode using the codec named by [`Self::serializer_id`].
    fn encode_wire(&self) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(self).map_err(|e| SerializationError::Encode {
            type_hint: Self::WIRE_NAME.to_string(),
            detail: e.to_string(),
        })
    }

    /// Decode bytes produced by [`Self::encode_wire`].
    fn decode_wire(bytes: &[u8]) -> Result<Self, SerializationError> {
        serde_json::from_slice(bytes).map_err(|e| SerializationError::Corrupt {
            type_hint: Self::WIRE_NAME.to_string(),
            detail: e.to_string(),
        })
    }
}

/// Fixed-width numeric wire types: little-endian, no length prefix.
macro_rules! fixed_width_wire {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl WireType for $ty {
            const WIRE_NAME: &'static str = $name;

            fn serializer_id() -> SerializerId {
                SerializerId::specialized()
            }

            fn encode_wire(&self) -> Result<Vec<u8>, SerializationError> {
                Ok(self.to_le_bytes().to_vec())
            }

            fn decode_wire(bytes: &[u8]) -> Result<Self, SerializationError> {
                let arr: [u8; size_of::<$ty>()] =
                    bytes.try_into().map_err(|_| SerializationError::Corrupt {
                        type_hint: $name.to_string(),
                        detail: format!(
                            "expected {} bytes, got {}",
                            size_of::<$ty>(),
                            bytes.len()
                        ),
                    })?;
                Ok(<$ty>::from_le_bytes(arr))
            }
        }
    )*};
}

fixed_width_wire! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    f32 => "f32",
    f64 => "f64",
}

impl WireType for String {
    const WIRE_NAME: &'static str = "String";
    const QUALIFIED_NAME: &'static str = "std::string::String";

    fn serializer_id() -> SerializerId {
        SerializerId::specialized()
    }

    fn encode_wire(&self) -> Result<Vec<u8>, SerializationError> {
        Ok(self.as_bytes().to_vec())
    }

    fn decode_wire(bytes: &[u8]) -> Result<Self, SerializationError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| SerializationError::Corrupt {
            type_hint: Self::WIRE_NAME.to_string(),
            detail: e.to_string(),
        })
    }
}

impl WireType for bool {
    const WIRE_NAME: &'static str = "bool";

    fn serializer_id() -> SerializerId {
        SerializerId::specialized()
    }

    fn encode_wire(&self) -> Result<Vec<u8>, SerializationError> {
        Ok(vec![u8::from(*self)])
    }

    fn decode_wire(bytes: &[u8]) -> Result<Self, SerializationError> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(SerializationError::Corrupt {
                type_hint: Self::WIRE_NAME.to_string(),
                detail: format!("expected one byte of 0 or 1, got {} bytes", bytes.len()),
            }),
        }
    }
}

impl WireType for Vec<u8> {
    const WIRE_NAME: &'static str = "Bytes";
    const QUALIFIED_NAME: &'static str = "std::vec::Vec<u8>";

    fn serializer_id() -> SerializerId {
        SerializerId::specialized()
    }

    fn encode_wire(&self) -> Result<Vec<u8>, SerializationError> {
        Ok(self.clone())
    }

    fn decode_wire(bytes: &[u8]) -> Result<Self, SerializationError> {
        Ok(bytes.to_vec())
    }
}

/// The void return: empty payload, no type hint.
impl WireType for () {
    const WIRE_NAME: &'static str = "Void";

    fn serializer_id() -> SerializerId {
        SerializerId::void()
    }

    fn encode_wire(&self) -> Result<Vec<u8>, SerializationError> {
        Ok(Vec::new())
    }

    fn decode_wire(bytes: &[u8]) -> Result<Self, SerializationError> {
        if bytes.is_empty() {
            Ok(())
        } else {
            Err(SerializationError::Corrupt {
                type_hint: Self::WIRE_NAME.to_string(),
                detail: format!("void payload must be empty, got {} bytes", bytes.len()),
            })
        }
    }
}

impl WireType for Uuid {
    const WIRE_NAME: &'static str = "Uuid";
    const QUALIFIED_NAME: &'static str = "uuid::Uuid";
}

impl WireType for DateTime<Utc> {
    const WIRE_NAME: &'static str = "Timestamp";
    const QUALIFIED_NAME: &'static str = "chrono::DateTime<chrono::Utc>";
}

impl WireType for Url {
    const WIRE_NAME: &'static str = "Url";
    const QUALIFIED_NAME: &'static str = "url::Url";
}
