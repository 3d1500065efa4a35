//! # edgelink-rt - Distributed Actor RPC Runtime
//!
//! A runtime that lets a client invoke methods on a logically remote
//! actor as if it were local. The runtime handles identity, argument
//! marshalling, transport, in-flight call lifecycle, response
//! correlation, per-call timeouts, and graceful shutdown; hand-written
//! stubs are the only code that knows a method's wire identifier.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use edgelink_rt::prelude::*;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! // 1. The server-side actor: a hand-written dispatch stub.
//! struct EchoActor { id: ActorId }
//!
//! #[async_trait]
//! impl DistributedActor for EchoActor {
//!     fn type_name(&self) -> &'static str { "EchoActor" }
//!     fn id(&self) -> &ActorId { &self.id }
//!
//!     async fn dispatch(
//!         &self,
//!         target: &str,
//!         mut decoder: InvocationDecoder,
//!         writer: ResponseWriter,
//!     ) -> Result<(), RpcError> {
//!         match target {
//!             "echo" => {
//!                 let input: String = match decoder.decode_next_argument() {
//!                     Ok(v) => v,
//!                     Err(e) => return Ok(writer.write_invocation_error(&e).await?),
//!                 };
//!                 writer.write_success(&input).await?;
//!                 Ok(())
//!             }
//!             _ => Ok(writer
//!                 .write_error(SerializedError::method_not_found(target))
//!                 .await?),
//!         }
//!     }
//! }
//!
//! // 2. Wire two systems together and call through.
//! #[tokio::main]
//! async fn main() -> Result<(), RpcError> {
//!     let (client_side, server_side) = InMemoryTransport::pair();
//!
//!     let server = ActorSystem::server(SystemConfig::default());
//!     server.actor_ready(Arc::new(EchoActor { id: ActorId::well_known("echo-1") }));
//!     server.serve(Arc::new(server_side)).await?;
//!
//!     let client = ActorSystem::client(SystemConfig::default(), Arc::new(client_side));
//!     let mut encoder = client.encoder();
//!     encoder.record_argument(&"hello".to_string())?;
//!     encoder.record_return_type::<String>()?;
//!     encoder.done_recording()?;
//!
//!     let reply: String = client
//!         .remote_call(&ActorId::well_known("echo-1"), "echo", encoder)
//!         .await?;
//!     assert_eq!(reply, "hello");
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Wire Model
//! - [`envelope`] - The addressed, metadata-stamped message carrier
//! - [`serialization`] - Manifest-driven codecs and the type registry
//! - [`invocation`] - Invocation encoding/decoding and result writing
//!
//! ## Runtime
//! - [`system`] - The actor system front door and error taxonomy
//! - [`lifecycle`] - In-flight call tracking, timeouts, drain
//! - [`transport`] - Transport seam, in-memory pair, framed RPC
//! - [`actor`] - The distributed actor dispatch seam
//!
//! ## Infrastructure
//! - [`metrics`] - Metrics behind an interface
//! - [`util`] - Identity primitives
//!
//! # Guarantees
//!
//! - Every remote call terminates exactly once: success, typed error,
//!   timeout, or cancellation.
//! - Response and Error envelopes carry the originating call id
//!   verbatim; correlation never depends on delivery order.
//! - Per (client, server actor) pair, invocations arrive in issue
//!   order; completions may be observed out of order because the server
//!   dispatches each envelope on its own task.
//! - After drain completes, the in-flight count is zero and the
//!   lifecycle manager is terminated.

pub mod actor;
pub mod envelope;
pub mod invocation;
pub mod lifecycle;
pub mod metrics;
pub mod serialization;
pub mod system;
pub mod transport;
pub mod util;

// Re-export commonly used types
pub use actor::DistributedActor;
pub use envelope::{Envelope, EnvelopeError, MessageType, Metadata, TraceContext};
pub use invocation::{
    InvocationData, InvocationDecoder, InvocationEncoder, InvocationError, InvocationProcessor,
    InvocationResult, ResponseWriter, SerializedError,
};
pub use lifecycle::{CallLifecycleManager, CompletionHandle, LifecyclePhase};
pub use metrics::{InMemoryMetrics, MetricsSink, NoopMetrics};
pub use serialization::{
    Manifest, SerializationError, SerializationRegistry, SerializerId, TypeRegistry, WireType,
};
pub use system::{ActorSystem, RpcError, SystemConfig};
pub use transport::{
    FramedTransport, InMemoryTransport, TlsConfig, Transport, TransportError, TransportMetadata,
};
pub use util::{ActorId, CallId};

/// Convenience imports for applications and stubs.
pub mod prelude {
    pub use crate::actor::DistributedActor;
    pub use crate::envelope::Envelope;
    pub use crate::invocation::{
        InvocationDecoder, InvocationEncoder, ResponseWriter, SerializedError,
    };
    pub use crate::serialization::{TypeRegistry, WireType};
    pub use crate::system::{ActorSystem, RpcError, SystemConfig};
    pub use crate::transport::{InMemoryTransport, Transport};
    pub use crate::util::{ActorId, CallId};
}
