//! Process-wide registry mapping type hints to concrete type descriptors.
//!
//! The receiver of a wire payload resolves the manifest's type hint here
//! before decoding. The registry is seeded with the built-in wire types
//! under both qualified and unqualified hints; applications register
//! their domain types at startup.

// Layer 1: Standard library imports
use std::sync::OnceLock;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use url::Url;
use uuid::Uuid;

// Layer 3: Internal module imports
use super::manifest::SerializerId;
use super::traits::WireType;
use crate::invocation::data::{InvocationData, SerializedError};

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Descriptor for a locally known wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Unqualified wire name
    pub wire_name: String,

    /// Qualified wire name
    pub qualified_name: String,

    /// Codec that encodes values of this type
    pub serializer_id: SerializerId,
}

impl TypeDescriptor {
    fn of<T: WireType>() -> Self {
        Self {
            wire_name: T::WIRE_NAME.to_string(),
            qualified_name: T::QUALIFIED_NAME.to_string(),
            serializer_id: T::serializer_id(),
        }
    }
}

/// Process-wide table of resolvable wire types.
///
/// Resolution tries the exact hint first, then the unqualified tail of a
/// qualified hint. Unknown hints surface as
/// [`SerializationError::UnknownType`](super::SerializationError::UnknownType)
/// at the call sites that consult the registry.
///
/// # Example
/// ```rust
/// use edgelink_rt::serialization::TypeRegistry;
///
/// let registry = TypeRegistry::global();
/// assert!(registry.resolve("String").is_some());
/// assert!(registry.resolve("std::string::String").is_some());
/// assert!(registry.resolve("app::Unknown").is_none());
/// ```
pub struct TypeRegistry {
    entries: DashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// The process-wide registry, seeded with built-ins on first use.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(TypeRegistry::seeded)
    }

    /// A registry pre-populated with the built-in wire types.
    fn seeded() -> Self {
        let registry = Self {
            entries: DashMap::new(),
        };
        registry.register::<String>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<bool>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<Vec<u8>>();
        registry.register::<()>();
        registry.register::<Uuid>();
        registry.register::<DateTime<Utc>>();
        registry.register::<Url>();
        // Runtime envelope payload types resolve like any other wire type.
        registry.register::<InvocationData>();
        registry.register::<SerializedError>();
        registry
    }

    /// Register a wire type under its unqualified and qualified hints.
    ///
    /// Re-registration is idempotent; the latest descriptor wins.
    pub fn register<T: WireType>(&self) {
        let descriptor = TypeDescriptor::of::<T>();
        self.entries
            .insert(T::WIRE_NAME.to_string(), descriptor.clone());
        if T::QUALIFIED_NAME != T::WIRE_NAME {
            self.entries
                .insert(T::QUALIFIED_NAME.to_string(), descriptor);
        }
    }

    /// Resolve a hint to a type descriptor.
    ///
    /// Tries the exact hint, then the unqualified tail of a qualified
    /// hint (`app::orders::Order` falls back to `Order`).
    pub fn resolve(&self, hint: &str) -> Option<TypeDescriptor> {
        if let Some(entry) = self.entries.get(hint) {
            return Some(entry.value().clone());
        }
        let tail = hint.rsplit("::").next()?;
        if tail != hint {
            if let Some(entry) = self.entries.get(tail) {
                return Some(entry.value().clone());
            }
        }
        None
    }

    /// Whether a hint resolves locally.
    pub fn contains(&self, hint: &str) -> bool {
        self.resolve(hint).is_some()
    }

    /// Number of registered hint entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Order {
        total: u64,
    }

    impl WireType for Order {
        const WIRE_NAME: &'static str = "Order";
        const QUALIFIED_NAME: &'static str = "shop::orders::Order";
    }

    #[test]
    fn test_builtins_resolve_under_both_hints() {
        let registry = TypeRegistry::global();
        assert!(registry.resolve("String").is_some());
        assert!(registry.resolve("std::string::String").is_some());
        assert!(registry.resolve("Timestamp").is_some());
        assert!(registry.resolve("uuid::Uuid").is_some());
    }

    #[test]
    fn test_unknown_hint_does_not_resolve() {
        assert!(TypeRegistry::global().resolve("app::Ghost").is_none());
    }

    #[test]
    fn test_domain_type_registration() {
        let registry = TypeRegistry::global();
        registry.register::<Order>();

        let descriptor = registry.resolve("Order").unwrap();
        assert_eq!(descriptor.qualified_name, "shop::orders::Order");
        assert_eq!(descriptor.serializer_id, SerializerId::json());
        assert!(registry.resolve("shop::orders::Order").is_some());
    }

    #[test]
    fn test_qualified_hint_falls_back_to_tail() {
        let registry = TypeRegistry::global();
        // Qualified hint with an unregistered path still resolves by tail.
        let descriptor = registry.resolve("some::other::path::String").unwrap();
        assert_eq!(descriptor.wire_name, "String");
    }

    #[test]
    fn test_invocation_payload_types_are_seeded() {
        let registry = TypeRegistry::global();
        assert!(registry.contains("InvocationData"));
        assert!(registry.contains("SerializedError"));
    }
}
