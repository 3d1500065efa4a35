//! The serialization registry: codec table plus serialize/deserialize.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::SerializationError;
use super::manifest::{Manifest, SerializerId};
use super::traits::WireType;
use super::type_registry::TypeRegistry;

/// Description of a registered codec.
#[derive(Debug, Clone)]
pub struct CodecSpec {
    /// The codec's serializer id
    pub id: SerializerId,

    /// Whether payloads from this codec need a type hint to decode
    pub requires_type_hint: bool,
}

/// Maps values to wire bytes and back, manifest-driven.
///
/// The registry gates which serializer ids this system accepts. Encoding
/// a value whose codec is not registered fails `UnsupportedType`; decoding
/// a payload whose manifest names an unregistered codec fails
/// `UnknownManifest`; hints that do not resolve through the
/// [`TypeRegistry`] fail `UnknownType`.
///
/// # Example
/// ```rust
/// use edgelink_rt::serialization::SerializationRegistry;
///
/// let registry = SerializationRegistry::new();
/// let (bytes, manifest) = registry.serialize(&"hello".to_string()).unwrap();
/// let back: String = registry.deserialize(&bytes, &manifest).unwrap();
/// assert_eq!(back, "hello");
/// ```
pub struct SerializationRegistry {
    codecs: DashMap<SerializerId, CodecSpec>,
}

impl SerializationRegistry {
    /// A registry with the built-in codecs enabled.
    pub fn new() -> Self {
        let registry = Self {
            codecs: DashMap::new(),
        };
        registry.register_codec(CodecSpec {
            id: SerializerId::json(),
            requires_type_hint: true,
        });
        registry.register_codec(CodecSpec {
            id: SerializerId::specialized(),
            requires_type_hint: true,
        });
        registry.register_codec(CodecSpec {
            id: SerializerId::void(),
            requires_type_hint: false,
        });
        registry
    }

    /// Enable a codec for this system.
    pub fn register_codec(&self, spec: CodecSpec) {
        self.codecs.insert(spec.id.clone(), spec);
    }

    /// Whether the given serializer id is enabled.
    pub fn is_registered(&self, id: &SerializerId) -> bool {
        self.codecs.contains_key(id)
    }

    /// Encode a value, producing the payload and its manifest.
    ///
    /// The manifest's type hint reflects the static type `T`, which the
    /// receiver resolves to pick the same codec and target type.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` when `T`'s codec is not registered here; `Encode`
    /// when the codec rejects the value.
    pub fn serialize<T: WireType>(
        &self,
        value: &T,
    ) -> Result<(Bytes, Manifest), SerializationError> {
        let id = T::serializer_id();
        let spec = self
            .codecs
            .get(&id)
            .ok_or_else(|| SerializationError::UnsupportedType {
                type_hint: T::WIRE_NAME.to_string(),
            })?;

        let hint = spec
            .requires_type_hint
            .then(|| T::WIRE_NAME.to_string());
        drop(spec);

        let bytes = value.encode_wire()?;
        Ok((Bytes::from(bytes), Manifest::new(id, hint)))
    }

    /// Decode a payload according to its manifest.
    ///
    /// # Errors
    ///
    /// `UnknownManifest` when the manifest's serializer id is not
    /// registered; `MissingTypeHint` when the codec needs a hint the
    /// manifest lacks; `UnknownType` when the hint does not resolve
    /// through the [`TypeRegistry`]; `Corrupt` on codec failure.
    pub fn deserialize<T: WireType>(
        &self,
        bytes: &[u8],
        manifest: &Manifest,
    ) -> Result<T, SerializationError> {
        let spec = self.codecs.get(&manifest.serializer_id).ok_or_else(|| {
            SerializationError::UnknownManifest {
                serializer_id: manifest.serializer_id.as_str().to_string(),
            }
        })?;

        if spec.requires_type_hint {
            let hint = manifest
                .hint()
                .ok_or_else(|| SerializationError::MissingTypeHint {
                    serializer_id: manifest.serializer_id.as_str().to_string(),
                })?;
            if TypeRegistry::global().resolve(hint).is_none() {
                return Err(SerializationError::UnknownType {
                    hint: hint.to_string(),
                });
            }
        }
        drop(spec);

        T::decode_wire(bytes)
    }
}

impl Default for SerializationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
