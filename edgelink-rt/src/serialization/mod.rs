//! Pluggable, manifest-driven serialization.
//!
//! Every value that crosses the wire travels with a [`Manifest`] naming the
//! codec that produced it and a type hint the receiver resolves through the
//! process-wide [`TypeRegistry`]. Built-in codecs cover general-purpose JSON,
//! a specialized little-endian primitive encoding, and the empty void form.

pub mod error;
pub mod manifest;
pub mod registry;
pub mod traits;
pub mod type_registry;

// Re-export commonly used types
pub use error::SerializationError;
pub use manifest::{Manifest, SerializerId};
pub use registry::SerializationRegistry;
pub use traits::WireType;
pub use type_registry::{TypeDescriptor, TypeRegistry};
