//! The [`DistributedActor`] trait.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::invocation::{InvocationDecoder, ResponseWriter};
use crate::system::errors::RpcError;
use crate::util::ActorId;

/// A unit of behavior whose methods can be invoked remotely.
///
/// Implementations are the server-side half of a stub pair: `dispatch`
/// is the hand-written counterpart of the client stub, matching target
/// identifiers to methods, decoding arguments positionally, and
/// reporting the outcome through the [`ResponseWriter`]. Exactly one
/// write must happen per dispatched call; the writer's consuming methods
/// enforce that.
///
/// A typical dispatch body:
///
/// ```rust,ignore
/// async fn dispatch(
///     &self,
///     target: &str,
///     mut decoder: InvocationDecoder,
///     writer: ResponseWriter,
/// ) -> Result<(), RpcError> {
///     match target {
///         "echo" => {
///             let input: String = match decoder.decode_next_argument() {
///                 Ok(value) => value,
///                 Err(e) => return Ok(writer.write_invocation_error(&e).await?),
///             };
///             writer.write_success(&self.echo(input).await).await?;
///             Ok(())
///         }
///         _ => Ok(writer.write_error(SerializedError::method_not_found(target)).await?),
///     }
/// }
/// ```
#[async_trait]
pub trait DistributedActor: Send + Sync + 'static {
    /// Stable name of the implementing type, used for typed resolution
    /// diagnostics.
    fn type_name(&self) -> &'static str;

    /// The identity this actor is registered under.
    fn id(&self) -> &ActorId;

    /// Execute one decoded invocation and report its outcome.
    ///
    /// Unknown targets must be answered with
    /// [`SerializedError::method_not_found`](crate::invocation::SerializedError::method_not_found).
    /// The returned error covers infrastructure failures only; method
    /// outcomes (including thrown domain errors) travel through the
    /// writer.
    async fn dispatch(
        &self,
        target: &str,
        decoder: InvocationDecoder,
        writer: ResponseWriter,
    ) -> Result<(), RpcError>;
}
