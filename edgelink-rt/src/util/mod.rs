//! Shared utility types for the runtime.
//!
//! Provides identity primitives used across every subsystem:
//! [`ActorId`] for actor identity and [`CallId`] for request correlation.

pub mod ids;

// Re-export commonly used types
pub use ids::{ActorId, CallId};
