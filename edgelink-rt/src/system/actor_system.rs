//! The actor system: outbound calls, inbound dispatch, shutdown.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use super::config::SystemConfig;
use super::errors::RpcError;
use super::registry::ActorRegistry;
use crate::actor::DistributedActor;
use crate::envelope::{Envelope, MessageType, TraceContext};
use crate::invocation::data::{InvocationResult, SerializedError};
use crate::invocation::{InvocationEncoder, InvocationProcessor};
use crate::lifecycle::CallLifecycleManager;
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::serialization::{SerializationRegistry, WireType};
use crate::transport::{Transport, TransportError};
use crate::util::ActorId;

/// Time granted to background tasks to finish after the transport
/// closes, before they are aborted.
const TASK_JOIN_GRACE: Duration = Duration::from_secs(1);

struct SystemInner {
    config: SystemConfig,
    serialization: Arc<SerializationRegistry>,
    processor: InvocationProcessor,
    registry: ActorRegistry,
    lifecycle: CallLifecycleManager,
    metrics: Arc<dyn MetricsSink>,
    transport: Option<Arc<dyn Transport>>,
    preassigned: Mutex<VecDeque<ActorId>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// The runtime front door.
///
/// A **client** system owns a transport and a lifecycle manager for its
/// outbound calls (and may still host local actors). A **server** system
/// owns no transport; the surrounding server feeds it an ingress
/// transport via [`serve`](Self::serve).
///
/// Cloning is cheap and shares the underlying system.
///
/// # Example
/// ```rust,ignore
/// let (client_side, server_side) = InMemoryTransport::pair();
/// let client = ActorSystem::client(SystemConfig::default(), Arc::new(client_side));
/// let server = ActorSystem::server(SystemConfig::default());
///
/// server.actor_ready(Arc::new(echo_actor));
/// server.serve(Arc::new(server_side)).await?;
///
/// let mut encoder = client.encoder();
/// encoder.record_argument(&"hello".to_string())?;
/// encoder.record_return_type::<String>()?;
/// encoder.done_recording()?;
/// let reply: String = client
///     .remote_call(&ActorId::well_known("echo-1"), "echo", encoder)
///     .await?;
/// ```
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

impl Clone for ActorSystem {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ActorSystem {
    fn build(
        config: SystemConfig,
        transport: Option<Arc<dyn Transport>>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let serialization = Arc::new(SerializationRegistry::new());
        let lifecycle =
            CallLifecycleManager::new(&config.metrics_namespace, Arc::clone(&metrics));
        let preassigned = config
            .preassigned_ids
            .iter()
            .map(ActorId::well_known)
            .collect();

        Self {
            inner: Arc::new(SystemInner {
                processor: InvocationProcessor::new(Arc::clone(&serialization)),
                serialization,
                registry: ActorRegistry::new(),
                lifecycle,
                metrics,
                transport,
                preassigned: Mutex::new(preassigned),
                tasks: Mutex::new(Vec::new()),
                config,
            }),
        }
    }

    /// A client-mode system owning the given transport.
    pub fn client(config: SystemConfig, transport: Arc<dyn Transport>) -> Self {
        Self::build(config, Some(transport), Arc::new(NoopMetrics::new()))
    }

    /// Client mode with an explicit metrics sink.
    pub fn client_with_metrics(
        config: SystemConfig,
        transport: Arc<dyn Transport>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self::build(config, Some(transport), metrics)
    }

    /// A server-mode system; the surrounding server owns the ingress
    /// transport.
    pub fn server(config: SystemConfig) -> Self {
        Self::build(config, None, Arc::new(NoopMetrics::new()))
    }

    /// Server mode with an explicit metrics sink.
    pub fn server_with_metrics(config: SystemConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        Self::build(config, None, metrics)
    }

    /// The system configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    /// The serialization registry shared by every call through this
    /// system.
    pub fn serialization(&self) -> &Arc<SerializationRegistry> {
        &self.inner.serialization
    }

    /// The call lifecycle manager.
    pub fn lifecycle(&self) -> &CallLifecycleManager {
        &self.inner.lifecycle
    }

    /// The metrics sink.
    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.inner.metrics
    }

    /// A fresh invocation encoder bound to this system.
    pub fn encoder(&self) -> InvocationEncoder {
        self.inner.processor.encoder()
    }

    // ------------------------------------------------------------------
    // Identity and registration
    // ------------------------------------------------------------------

    /// Hand out an actor id: pre-seeded ids first, then generated ones.
    /// Ids consumed from the seed queue are never reissued.
    pub fn assign_id(&self) -> ActorId {
        self.inner
            .preassigned
            .lock()
            .pop_front()
            .unwrap_or_else(ActorId::generate)
    }

    /// Register a local actor, making it dispatchable.
    pub fn actor_ready<A: DistributedActor>(&self, actor: Arc<A>) {
        debug!(actor_id = %actor.id(), label = %self.inner.config.logger_label, "actor ready");
        self.inner.registry.register(actor);
    }

    /// Remove a local actor registration.
    pub fn resign_id(&self, id: &ActorId) -> Result<(), RpcError> {
        self.inner.registry.unregister(id)
    }

    /// Resolve an id to a local actor of type `A`.
    ///
    /// `Ok(None)` signals the id is not hosted here and the caller
    /// should construct a remote proxy.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the local entry's dynamic type disagrees.
    pub fn resolve<A: DistributedActor>(&self, id: &ActorId) -> Result<Option<Arc<A>>, RpcError> {
        self.inner.registry.resolve_typed(id)
    }

    /// Number of locally registered actors.
    pub fn actor_count(&self) -> usize {
        self.inner.registry.count()
    }

    // ------------------------------------------------------------------
    // Client side: outbound calls
    // ------------------------------------------------------------------

    /// Invoke a value-returning method on a remote actor.
    ///
    /// The encoder must have finished recording (`done_recording`).
    /// Exactly one of a return value or a typed error comes back; a Void
    /// result for a value-returning call is a `ProtocolMismatch`.
    pub async fn remote_call<R: WireType>(
        &self,
        recipient: &ActorId,
        target: &str,
        mut encoder: InvocationEncoder,
    ) -> Result<R, RpcError> {
        let reply = self.issue_call(recipient, target, &mut encoder).await?;
        match self.inner.processor.extract_result(&reply)? {
            InvocationResult::Success { manifest, data } => {
                Ok(self.inner.serialization.deserialize(&data, &manifest)?)
            }
            InvocationResult::Void => Err(RpcError::ProtocolMismatch(
                "void result for a value-returning call".to_string(),
            )),
            InvocationResult::Error(error) => {
                Err(RpcError::from_wire_error(error, recipient, target))
            }
        }
    }

    /// Invoke a void method on a remote actor.
    pub async fn remote_call_void(
        &self,
        recipient: &ActorId,
        target: &str,
        mut encoder: InvocationEncoder,
    ) -> Result<(), RpcError> {
        let reply = self.issue_call(recipient, target, &mut encoder).await?;
        match self.inner.processor.extract_result(&reply)? {
            InvocationResult::Void => Ok(()),
            InvocationResult::Success { .. } => Err(RpcError::ProtocolMismatch(
                "value result for a void call".to_string(),
            )),
            InvocationResult::Error(error) => {
                Err(RpcError::from_wire_error(error, recipient, target))
            }
        }
    }

    /// Common call path: encode, register in-flight, send, await.
    async fn issue_call(
        &self,
        recipient: &ActorId,
        target: &str,
        encoder: &mut InvocationEncoder,
    ) -> Result<Envelope, RpcError> {
        let transport = self
            .inner
            .transport
            .as_ref()
            .map(Arc::clone)
            .ok_or(RpcError::Transport(TransportError::Disconnected))?;

        let trace = if self.inner.config.trace_propagation {
            TraceContext::generate()
        } else {
            TraceContext::empty()
        };
        let envelope = self.inner.processor.create_invocation_envelope(
            recipient.clone(),
            None,
            target,
            encoder,
            &trace,
        )?;
        let call_id = envelope.call_id().to_string();

        let mut handle = self
            .inner
            .lifecycle
            .register(&call_id, self.inner.config.call_timeout)?;
        let guard = CancelGuard::new(self.inner.lifecycle.clone(), call_id.clone());

        // Race the send against the completion handle so a stuck
        // synchronous-response transport cannot outlive the timeout.
        let send_fut = transport.send(envelope);
        tokio::pin!(send_fut);

        let raced = tokio::select! {
            outcome = &mut handle => Some(outcome),
            sent = &mut send_fut => {
                match sent {
                    // Synchronous-response transport: deliver ourselves.
                    Ok(Some(reply)) => self.deliver_reply(reply),
                    // Asynchronous transport: the receiver task resolves.
                    Ok(None) => {}
                    Err(e) => self.inner.lifecycle.fail(&call_id, RpcError::Transport(e)),
                }
                None
            }
        };
        let outcome = match raced {
            Some(outcome) => outcome,
            None => handle.await,
        };

        guard.disarm();
        outcome
    }

    /// Route an inbound Response/Error envelope to its waiting call.
    fn deliver_reply(&self, envelope: Envelope) {
        match envelope.message_type() {
            MessageType::Response | MessageType::Error => {
                let call_id = envelope.call_id().to_string();
                self.inner.lifecycle.succeed(&call_id, envelope);
            }
            other => {
                warn!(kind = ?other, "unexpected envelope delivered as a call reply; dropping");
            }
        }
    }

    /// Spawn a receiver task for an asynchronous transport: inbound
    /// Response/Error envelopes resolve in-flight calls by call id.
    pub async fn attach_receiver(&self, transport: Arc<dyn Transport>) -> Result<(), RpcError> {
        let mut ingress = transport.receive().await?;
        let system = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(envelope) = ingress.recv().await {
                match envelope.message_type() {
                    MessageType::Response | MessageType::Error => system.deliver_reply(envelope),
                    other => {
                        debug!(kind = ?other, "ignoring non-reply envelope on client ingress");
                    }
                }
            }
        });
        self.inner.tasks.lock().push(handle);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Server side: inbound dispatch
    // ------------------------------------------------------------------

    /// Dispatch one inbound Invocation envelope to its registered actor,
    /// reporting the outcome through the transport.
    ///
    /// Unknown recipients are answered with an `ActorNotFound` error
    /// envelope; no actor is dispatched.
    pub async fn execute_distributed_target(
        &self,
        envelope: Envelope,
        transport: Arc<dyn Transport>,
    ) -> Result<(), RpcError> {
        if envelope.message_type() != MessageType::Invocation {
            return Err(RpcError::ProtocolMismatch(
                "only Invocation envelopes can be dispatched".to_string(),
            ));
        }

        let writer = self.inner.processor.create_response_writer(&envelope, transport);

        let record = match self.inner.registry.find(envelope.recipient()) {
            Some(record) => record,
            None => {
                warn!(actor_id = %envelope.recipient(), "invocation for unknown actor");
                writer
                    .write_error(SerializedError::actor_not_found(envelope.recipient()))
                    .await?;
                return Ok(());
            }
        };

        let decoder = match self.inner.processor.create_invocation_decoder(&envelope) {
            Ok(decoder) => decoder,
            Err(e) => {
                writer.write_invocation_error(&e).await?;
                return Ok(());
            }
        };

        debug!(
            actor_id = %envelope.recipient(),
            target = %envelope.target(),
            call_id = %envelope.call_id(),
            "dispatching invocation"
        );
        record
            .dispatcher()
            .dispatch(envelope.target(), decoder, writer)
            .await
    }

    /// Run the server ingress loop over a transport.
    ///
    /// Each inbound Invocation envelope is dispatched on its own task;
    /// there is no cross-envelope ordering. The loop ends when the
    /// transport closes.
    pub async fn serve(&self, transport: Arc<dyn Transport>) -> Result<(), RpcError> {
        let mut ingress = transport.receive().await?;
        let system = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(envelope) = ingress.recv().await {
                match envelope.message_type() {
                    MessageType::Invocation => {
                        let system = system.clone();
                        let transport = Arc::clone(&transport);
                        tokio::spawn(async move {
                            if let Err(e) =
                                system.execute_distributed_target(envelope, transport).await
                            {
                                error!(error = %e, "invocation dispatch failed");
                            }
                        });
                    }
                    other => {
                        debug!(kind = ?other, "ignoring non-invocation envelope on server ingress");
                    }
                }
            }
        });
        self.inner.tasks.lock().push(handle);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------

    /// Shut down gracefully: stop accepting calls, drain in-flight work
    /// within a bounded grace period, cancel stragglers, close the
    /// transport, and join background tasks.
    pub async fn shutdown(&self) {
        let in_flight = self.inner.lifecycle.in_flight_count() as u32;
        let expected = self
            .inner
            .config
            .call_timeout
            .checked_mul(in_flight)
            .unwrap_or(self.inner.config.call_timeout);
        let grace = self.inner.config.shutdown_grace.max(expected);

        self.inner.lifecycle.drain(grace).await;

        if let Some(transport) = &self.inner.transport {
            if let Err(e) = transport.close().await {
                warn!(error = %e, "transport close failed during shutdown");
            }
        }

        let handles: Vec<JoinHandle<()>> = self.inner.tasks.lock().drain(..).collect();
        for handle in handles {
            let abort = handle.abort_handle();
            if tokio::time::timeout(TASK_JOIN_GRACE, handle).await.is_err() {
                abort.abort();
            }
        }
    }
}

/// Fails the in-flight entry with `Cancelled` if the issuing future is
/// dropped before the call resolves.
struct CancelGuard {
    lifecycle: CallLifecycleManager,
    call_id: String,
    armed: bool,
}

impl CancelGuard {
    fn new(lifecycle: CallLifecycleManager, call_id: String) -> Self {
        Self {
            lifecycle,
            call_id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.lifecycle.fail(&self.call_id, RpcError::Cancelled);
        }
    }
}
