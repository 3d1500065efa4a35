//! End-to-end pipeline tests over the in-memory paired transport.
//!
//! Drives the full client/server flow: encoder → envelope → transport →
//! dispatch → result writer → lifecycle manager → typed return.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use edgelink_rt::lifecycle::LifecyclePhase;
use edgelink_rt::metrics::{namespaced, names, InMemoryMetrics, MetricsSink};
use edgelink_rt::prelude::*;
use edgelink_rt::serialization::SerializerId;
use edgelink_rt::transport::{TransportError, TransportMetadata};
use edgelink_rt::{Envelope, InvocationError, MessageType};

// ---------------------------------------------------------------------
// Test actors and stubs
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("my error with code {code}")]
struct MyErr {
    code: u32,
}

impl WireType for MyErr {
    const WIRE_NAME: &'static str = "MyErr";
}

struct EchoActor {
    id: ActorId,
}

#[async_trait]
impl DistributedActor for EchoActor {
    fn type_name(&self) -> &'static str {
        "EchoActor"
    }

    fn id(&self) -> &ActorId {
        &self.id
    }

    async fn dispatch(
        &self,
        target: &str,
        mut decoder: InvocationDecoder,
        writer: ResponseWriter,
    ) -> Result<(), RpcError> {
        match target {
            "echo" => {
                if let Err(e) = decoder.expect_arity(1) {
                    return Ok(writer.write_invocation_error(&e).await?);
                }
                let input: String = match decoder.decode_next_argument() {
                    Ok(v) => v,
                    Err(e) => return Ok(writer.write_invocation_error(&e).await?),
                };
                writer.write_success(&input).await?;
                Ok(())
            }
            _ => Ok(writer
                .write_error(SerializedError::method_not_found(target))
                .await?),
        }
    }
}

#[derive(Debug)]
struct CounterActor {
    id: ActorId,
    count: AtomicU64,
}

#[async_trait]
impl DistributedActor for CounterActor {
    fn type_name(&self) -> &'static str {
        "CounterActor"
    }

    fn id(&self) -> &ActorId {
        &self.id
    }

    async fn dispatch(
        &self,
        target: &str,
        _decoder: InvocationDecoder,
        writer: ResponseWriter,
    ) -> Result<(), RpcError> {
        match target {
            "inc" => {
                self.count.fetch_add(1, Ordering::SeqCst);
                writer.write_void().await?;
                Ok(())
            }
            _ => Ok(writer
                .write_error(SerializedError::method_not_found(target))
                .await?),
        }
    }
}

/// Fails every call with `MyErr { code: 7 }`; sleeps on demand.
struct FlakyActor {
    id: ActorId,
}

#[async_trait]
impl DistributedActor for FlakyActor {
    fn type_name(&self) -> &'static str {
        "FlakyActor"
    }

    fn id(&self) -> &ActorId {
        &self.id
    }

    async fn dispatch(
        &self,
        target: &str,
        mut decoder: InvocationDecoder,
        writer: ResponseWriter,
    ) -> Result<(), RpcError> {
        match target {
            "fail" => {
                let error = MyErr { code: 7 };
                writer.write_error(SerializedError::capture(&error)).await?;
                Ok(())
            }
            "sleep" => {
                let millis: u64 = match decoder.decode_next_argument() {
                    Ok(v) => v,
                    Err(e) => return Ok(writer.write_invocation_error(&e).await?),
                };
                tokio::time::sleep(Duration::from_millis(millis)).await;
                writer.write_void().await?;
                Ok(())
            }
            _ => Ok(writer
                .write_error(SerializedError::method_not_found(target))
                .await?),
        }
    }
}

/// Hand-written client stub: the only code that knows the wire targets.
struct EchoClient {
    system: ActorSystem,
    id: ActorId,
}

impl EchoClient {
    async fn echo(&self, input: &str) -> Result<String, RpcError> {
        let mut encoder = self.system.encoder();
        encoder.record_argument(&input.to_string())?;
        encoder.record_return_type::<String>()?;
        encoder.done_recording()?;
        self.system.remote_call(&self.id, "echo", encoder).await
    }
}

// ---------------------------------------------------------------------
// Recording transport wrapper
// ---------------------------------------------------------------------

/// Delegating transport that records every envelope it sends.
struct RecordingTransport {
    inner: InMemoryTransport,
    sent: Mutex<Vec<Envelope>>,
}

impl RecordingTransport {
    fn new(inner: InMemoryTransport) -> Self {
        Self {
            inner,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, envelope: Envelope) -> Result<Option<Envelope>, TransportError> {
        self.sent.lock().push(envelope.clone());
        self.inner.send(envelope).await
    }

    async fn receive(&self) -> Result<UnboundedReceiver<Envelope>, TransportError> {
        self.inner.receive().await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.close().await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn metadata(&self) -> TransportMetadata {
        self.inner.metadata()
    }
}

// ---------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------

struct Fixture {
    client: ActorSystem,
    server: ActorSystem,
    client_transport: Arc<RecordingTransport>,
    server_transport: Arc<RecordingTransport>,
    client_metrics: Arc<InMemoryMetrics>,
}

/// Make `RUST_LOG`-driven output available when a test is run by hand.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn fixture(client_config: SystemConfig) -> Fixture {
    init_tracing();
    let (client_side, server_side) = InMemoryTransport::pair();
    let client_transport = Arc::new(RecordingTransport::new(client_side));
    let server_transport = Arc::new(RecordingTransport::new(server_side));

    let client_metrics = Arc::new(InMemoryMetrics::new());
    let client = ActorSystem::client_with_metrics(
        client_config,
        Arc::clone(&client_transport) as Arc<dyn Transport>,
        Arc::clone(&client_metrics) as Arc<dyn MetricsSink>,
    );

    let server = ActorSystem::server(SystemConfig::default());
    server
        .serve(Arc::clone(&server_transport) as Arc<dyn Transport>)
        .await
        .unwrap();

    Fixture {
        client,
        server,
        client_transport,
        server_transport,
        client_metrics,
    }
}

fn timeouts_counter(metrics: &InMemoryMetrics, namespace: &str) -> u64 {
    metrics.counter(&namespaced(namespace, names::TIMEOUTS))
}

// ---------------------------------------------------------------------
// Seed scenario 1: echo happy path
// ---------------------------------------------------------------------

#[tokio::test]
async fn echo_string_happy_path() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("echo-1");
    fx.server.actor_ready(Arc::new(EchoActor { id: id.clone() }));

    let stub = EchoClient {
        system: fx.client.clone(),
        id,
    };
    let reply = stub.echo("hello").await.unwrap();
    assert_eq!(reply, "hello");

    // Exactly one Invocation and one Response crossed the wire, with
    // the same call id.
    let outbound = fx.client_transport.sent();
    let replies = fx.server_transport.sent();
    assert_eq!(outbound.len(), 1);
    assert_eq!(replies.len(), 1);
    assert_eq!(outbound[0].message_type(), MessageType::Invocation);
    assert_eq!(replies[0].message_type(), MessageType::Response);
    assert_eq!(outbound[0].call_id(), replies[0].call_id());

    // No timeouts fired.
    assert_eq!(timeouts_counter(&fx.client_metrics, "edgelink"), 0);
    assert_eq!(fx.client.lifecycle().in_flight_count(), 0);
}

// ---------------------------------------------------------------------
// Seed scenario 2: void call
// ---------------------------------------------------------------------

#[tokio::test]
async fn void_call_increments_and_answers_empty() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("counter");
    let actor = Arc::new(CounterActor {
        id: id.clone(),
        count: AtomicU64::new(0),
    });
    fx.server.actor_ready(Arc::clone(&actor));

    let mut encoder = fx.client.encoder();
    encoder.record_return_type::<()>().unwrap();
    encoder.done_recording().unwrap();
    fx.client.remote_call_void(&id, "inc", encoder).await.unwrap();

    assert_eq!(actor.count.load(Ordering::SeqCst), 1);

    // The Response envelope carries the void manifest and no payload.
    let replies = fx.server_transport.sent();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].manifest().serializer_id, SerializerId::void());
    assert!(replies[0].payload().is_empty());
}

// ---------------------------------------------------------------------
// Seed scenario 3: server throws a typed error
// ---------------------------------------------------------------------

#[tokio::test]
async fn server_thrown_error_recovers_typed() {
    TypeRegistry::global().register::<MyErr>();

    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("flaky");
    fx.server.actor_ready(Arc::new(FlakyActor { id: id.clone() }));

    let mut encoder = fx.client.encoder();
    encoder.record_error_type::<MyErr>().unwrap();
    encoder.record_return_type::<()>().unwrap();
    encoder.done_recording().unwrap();

    let err = fx
        .client
        .remote_call_void(&id, "fail", encoder)
        .await
        .unwrap_err();

    let remote = err.as_remote().expect("remote error");
    assert_eq!(remote.type_name, "MyErr");
    assert_eq!(remote.try_decode::<MyErr>(), Some(MyErr { code: 7 }));
}

// ---------------------------------------------------------------------
// Seed scenario 4: timeout, late response dropped
// ---------------------------------------------------------------------

#[tokio::test]
async fn timeout_fires_and_late_response_is_dropped() {
    let config = SystemConfig::builder()
        .with_call_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let fx = fixture(config).await;
    let id = ActorId::well_known("flaky");
    fx.server.actor_ready(Arc::new(FlakyActor { id: id.clone() }));

    let mut encoder = fx.client.encoder();
    encoder.record_argument(&400u64).unwrap();
    encoder.record_return_type::<()>().unwrap();
    encoder.done_recording().unwrap();

    let started = Instant::now();
    let err = fx
        .client
        .remote_call_void(&id, "sleep", encoder)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, RpcError::Timeout { .. }));
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(200));
    assert_eq!(timeouts_counter(&fx.client_metrics, "edgelink"), 1);

    // Let the server's late reply arrive; it must be discarded without
    // resolving anything.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(fx.client.lifecycle().in_flight_count(), 0);
    assert_eq!(timeouts_counter(&fx.client_metrics, "edgelink"), 1);
}

// ---------------------------------------------------------------------
// Seed scenario 5: graceful drain
// ---------------------------------------------------------------------

#[tokio::test]
async fn graceful_drain_completes_in_flight_calls() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("flaky");
    fx.server.actor_ready(Arc::new(FlakyActor { id: id.clone() }));

    // 10 in-flight calls with ~100 ms server latency.
    let mut calls = Vec::new();
    for _ in 0..10 {
        let client = fx.client.clone();
        let id = id.clone();
        calls.push(tokio::spawn(async move {
            let mut encoder = client.encoder();
            encoder.record_argument(&100u64).unwrap();
            encoder.record_return_type::<()>().unwrap();
            encoder.done_recording().unwrap();
            client.remote_call_void(&id, "sleep", encoder).await
        }));
    }

    // Give the calls a moment to register before draining.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fx.client.lifecycle().phase(), LifecyclePhase::Running);

    fx.client.lifecycle().drain(Duration::from_millis(500)).await;

    assert_eq!(fx.client.lifecycle().phase(), LifecyclePhase::Terminated);
    assert_eq!(fx.client.lifecycle().in_flight_count(), 0);

    for call in calls {
        call.await.unwrap().unwrap();
    }

    let samples = fx
        .client_metrics
        .histogram(&namespaced("edgelink", names::DRAIN_DURATION_MS));
    assert_eq!(samples.len(), 1);
    assert!(samples[0] <= 500.0);
}

// ---------------------------------------------------------------------
// Seed scenario 6: unknown recipient
// ---------------------------------------------------------------------

#[tokio::test]
async fn unknown_recipient_raises_actor_not_found() {
    let fx = fixture(SystemConfig::default()).await;
    let ghost = ActorId::well_known("ghost");

    let mut encoder = fx.client.encoder();
    encoder.record_return_type::<String>().unwrap();
    encoder.done_recording().unwrap();

    let err = fx
        .client
        .remote_call::<String>(&ghost, "echo", encoder)
        .await
        .unwrap_err();
    assert_eq!(err, RpcError::ActorNotFound(ghost));

    // The server answered with an Error envelope under the stable name.
    let replies = fx.server_transport.sent();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].message_type(), MessageType::Error);
    assert!(replies[0]
        .manifest()
        .hint()
        .is_some_and(|h| h == "SerializedError"));
}

// ---------------------------------------------------------------------
// Boundary behaviors and quantified invariants
// ---------------------------------------------------------------------

#[tokio::test]
async fn zero_argument_invocation_is_valid() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("counter");
    let actor = Arc::new(CounterActor {
        id: id.clone(),
        count: AtomicU64::new(0),
    });
    fx.server.actor_ready(actor);

    let mut encoder = fx.client.encoder();
    encoder.record_return_type::<()>().unwrap();
    encoder.done_recording().unwrap();
    fx.client.remote_call_void(&id, "inc", encoder).await.unwrap();
}

#[tokio::test]
async fn zero_timeout_fires_without_blocking() {
    let config = SystemConfig::builder()
        .with_call_timeout(Duration::ZERO)
        .build()
        .unwrap();
    let fx = fixture(config).await;
    let id = ActorId::well_known("flaky");
    fx.server.actor_ready(Arc::new(FlakyActor { id: id.clone() }));

    let mut encoder = fx.client.encoder();
    encoder.record_argument(&100u64).unwrap();
    encoder.record_return_type::<()>().unwrap();
    encoder.done_recording().unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_millis(200),
        fx.client.remote_call_void(&id, "sleep", encoder),
    )
    .await
    .expect("zero timeout must not block");
    assert!(matches!(outcome, Err(RpcError::Timeout { .. })));
}

#[tokio::test]
async fn method_not_found_is_typed() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("echo-1");
    fx.server.actor_ready(Arc::new(EchoActor { id: id.clone() }));

    let mut encoder = fx.client.encoder();
    encoder.record_return_type::<String>().unwrap();
    encoder.done_recording().unwrap();

    let err = fx
        .client
        .remote_call::<String>(&id, "frobnicate", encoder)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RpcError::Invocation(InvocationError::MethodNotFound { .. })
    ));
}

#[tokio::test]
async fn concurrent_calls_each_complete_exactly_once() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("echo-1");
    fx.server.actor_ready(Arc::new(EchoActor { id: id.clone() }));

    const CALLS: usize = 16;
    let mut handles = Vec::new();
    for i in 0..CALLS {
        let stub = EchoClient {
            system: fx.client.clone(),
            id: id.clone(),
        };
        handles.push(tokio::spawn(async move {
            stub.echo(&format!("message-{i}")).await
        }));
    }

    let mut successes = 0usize;
    for (i, handle) in handles.into_iter().enumerate() {
        let reply = handle.await.unwrap().unwrap();
        assert_eq!(reply, format!("message-{i}"));
        successes += 1;
    }
    assert_eq!(successes, CALLS);
    assert_eq!(fx.client.lifecycle().in_flight_count(), 0);

    // Every invocation used a distinct call id.
    let outbound = fx.client_transport.sent();
    let mut call_ids: Vec<_> = outbound.iter().map(|e| e.call_id().to_string()).collect();
    call_ids.sort();
    call_ids.dedup();
    assert_eq!(call_ids.len(), CALLS);
}

#[tokio::test]
async fn calls_rejected_after_shutdown() {
    let fx = fixture(SystemConfig::default()).await;
    fx.client.shutdown().await;

    let mut encoder = fx.client.encoder();
    encoder.record_return_type::<String>().unwrap();
    encoder.done_recording().unwrap();

    let err = fx
        .client
        .remote_call::<String>(&ActorId::well_known("echo-1"), "echo", encoder)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::SystemShutDown));
    assert!(!fx.client_transport.is_connected());
}

#[tokio::test]
async fn resolve_prefers_local_actors() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("echo-1");
    let actor = Arc::new(EchoActor { id: id.clone() });
    fx.server.actor_ready(Arc::clone(&actor));

    // Locally registered: resolves to the same reference.
    let resolved = fx.server.resolve::<EchoActor>(&id).unwrap().unwrap();
    assert!(Arc::ptr_eq(&resolved, &actor));

    // Unknown locally: signals remote-proxy construction.
    assert!(fx
        .client
        .resolve::<EchoActor>(&id)
        .unwrap()
        .is_none());

    // Wrong type: refuses.
    let err = fx.server.resolve::<CounterActor>(&id).unwrap_err();
    assert!(matches!(err, RpcError::TypeMismatch { .. }));

    // After resignation the id is free again.
    fx.server.resign_id(&id).unwrap();
    assert!(fx.server.resolve::<EchoActor>(&id).unwrap().is_none());
}

#[tokio::test]
async fn trace_headers_propagate_to_the_server() {
    let fx = fixture(SystemConfig::default()).await;
    let id = ActorId::well_known("echo-1");
    fx.server.actor_ready(Arc::new(EchoActor { id: id.clone() }));

    let stub = EchoClient {
        system: fx.client.clone(),
        id,
    };
    stub.echo("traced").await.unwrap();

    let outbound = fx.client_transport.sent();
    assert!(outbound[0].metadata().header("trace-id").is_some());
}

#[tokio::test]
async fn headers_survive_the_wire_round_trip() {
    // Envelope equality through the canonical codec, with headers.
    let mut headers = HashMap::new();
    headers.insert("tenant".to_string(), "acme".to_string());
    let envelope = Envelope::invocation(
        ActorId::well_known("echo-1"),
        Some(ActorId::well_known("client")),
        "echo",
        "call-1",
        edgelink_rt::Manifest::void(),
        bytes::Bytes::new(),
        headers,
    )
    .unwrap();

    let bytes = envelope.to_wire().unwrap();
    assert_eq!(Envelope::from_wire(&bytes).unwrap(), envelope);
}
