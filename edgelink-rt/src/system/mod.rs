//! The actor system front door.
//!
//! [`ActorSystem`] ties the subsystems together: it owns the transport
//! (client mode), the local actor [`ActorRegistry`], the serialization
//! registry, the invocation processor, and the call lifecycle manager,
//! and implements outbound `remote_call` plus inbound dispatch.

pub mod actor_system;
pub mod config;
pub mod errors;
pub mod registry;

// Re-export commonly used types
pub use actor_system::ActorSystem;
pub use config::{SystemConfig, SystemConfigBuilder};
pub use errors::RpcError;
pub use registry::{ActorRegistry, RegisteredActor};
