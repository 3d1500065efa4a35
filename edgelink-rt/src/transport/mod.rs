//! The transport abstraction and its built-in implementations.
//!
//! A [`Transport`] moves envelopes between two peers. The
//! [`InMemoryTransport`] pairs two instances in-process for testing the
//! full pipeline without a network; the [`FramedTransport`] carries
//! envelopes over any bidirectional byte stream with length-delimited
//! framing.

pub mod error;
pub mod framed;
pub mod in_memory;
pub mod tls;
pub mod traits;

// Re-export commonly used types
pub use error::TransportError;
pub use framed::FramedTransport;
pub use in_memory::InMemoryTransport;
pub use tls::{TlsConfig, TlsVersion, VerificationMode};
pub use traits::{Transport, TransportMetadata};
