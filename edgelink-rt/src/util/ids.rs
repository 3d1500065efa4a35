// Layer 1: Standard library imports
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

// Layer 2: Third-party crate imports
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Number of hex characters kept when generating a random actor id.
const GENERATED_ID_LEN: usize = 12;

/// Opaque identifier for actors in the system.
///
/// Equality and hashing are by exact string value. An id may carry a
/// metadata map for out-of-band annotations; metadata never participates
/// in equality, hashing, or the wire representation.
///
/// # Construction
///
/// Two forms exist: a stable well-known value shared out-of-band between
/// peers, and a generated short random token for anonymous actors.
///
/// # Example
/// ```rust
/// use edgelink_rt::util::ActorId;
///
/// let server = ActorId::well_known("chat-server");
/// assert_eq!(server, ActorId::well_known("chat-server"));
///
/// let a = ActorId::generate();
/// let b = ActorId::generate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct ActorId {
    value: String,
    metadata: HashMap<String, String>,
}

impl ActorId {
    /// Create an id with a stable well-known value.
    pub fn well_known(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            metadata: HashMap::new(),
        }
    }

    /// Generate a fresh id with a short random token.
    pub fn generate() -> Self {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(GENERATED_ID_LEN);
        Self {
            value: token,
            metadata: HashMap::new(),
        }
    }

    /// The identifying string value.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Attach a metadata entry, returning the id for chaining.
    ///
    /// Metadata is local annotation only; it does not travel on the wire
    /// and does not affect equality.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Read back a metadata entry.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl PartialEq for ActorId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ActorId {}

impl Hash for ActorId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// The wire representation is the bare string; metadata stays local.
impl Serialize for ActorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for ActorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ActorId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an actor id string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ActorId, E> {
                Ok(ActorId::well_known(v))
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

/// Unique per-call correlation identifier.
///
/// A call id is generated once per outbound remote call and is never
/// reused within the issuing system. Response and error envelopes carry
/// the originating call id verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Generate a fresh unique call id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing call id string.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, yielding the string value.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_equality() {
        let a = ActorId::well_known("chat-server");
        let b = ActorId::well_known("chat-server");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_ids_unique() {
        let a = ActorId::generate();
        let b = ActorId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), GENERATED_ID_LEN);
    }

    #[test]
    fn test_metadata_excluded_from_equality() {
        let plain = ActorId::well_known("worker");
        let annotated = ActorId::well_known("worker").with_metadata("zone", "eu-west");

        assert_eq!(plain, annotated);
        assert_eq!(annotated.metadata("zone"), Some("eu-west"));
        assert_eq!(plain.metadata("zone"), None);
    }

    #[test]
    fn test_metadata_excluded_from_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ActorId::well_known("worker").with_metadata("zone", "eu-west"));
        assert!(set.contains(&ActorId::well_known("worker")));
    }

    #[test]
    fn test_wire_form_is_bare_string() {
        let id = ActorId::well_known("chat-server").with_metadata("zone", "eu-west");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"chat-server\"");

        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.metadata("zone"), None);
    }

    #[test]
    fn test_display() {
        let id = ActorId::well_known("echo-1");
        assert_eq!(format!("{id}"), "echo-1");
    }

    #[test]
    fn test_call_id_unique() {
        let a = CallId::generate();
        let b = CallId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_call_id_transparent_serde() {
        let id = CallId::from_string("call-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"call-42\"");
    }
}
