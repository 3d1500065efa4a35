//! In-memory paired transport for driving the full pipeline in tests.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::warn;

// Layer 3: Internal module imports
use super::error::TransportError;
use super::traits::{Transport, TransportMetadata};
use crate::envelope::{Envelope, MessageType};

/// One side's shared state. Each transport holds its own side plus the
/// peer's, so a Response sent by one side can resolve the call waiting
/// on the other.
struct Side {
    label: &'static str,
    inbound_tx: Mutex<Option<UnboundedSender<Envelope>>>,
    pending: DashMap<String, oneshot::Sender<Envelope>>,
    closed: AtomicBool,
    connected_at: DateTime<Utc>,
}

impl Side {
    fn new(label: &'static str, inbound_tx: UnboundedSender<Envelope>) -> Arc<Self> {
        Arc::new(Self {
            label,
            inbound_tx: Mutex::new(Some(inbound_tx)),
            pending: DashMap::new(),
            closed: AtomicBool::new(false),
            connected_at: Utc::now(),
        })
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn deliver(&self, envelope: Envelope) -> bool {
        if self.is_closed() {
            return false;
        }
        match &*self.inbound_tx.lock() {
            Some(tx) => tx.send(envelope).is_ok(),
            None => false,
        }
    }
}

/// Removes the in-flight wait entry if the awaiting send is dropped, so
/// a late response is logged and discarded instead of leaking the slot.
struct PendingGuard {
    side: Arc<Side>,
    call_id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.side.pending.remove(&self.call_id);
    }
}

/// Synchronous-response transport connecting two peers in-process.
///
/// `a.send(invocation)` enqueues the envelope on `b`'s inbound queue and
/// waits for the correlated Response or Error envelope, matched by call
/// id through a per-side wait map. Responses with no waiting call are
/// logged and dropped.
///
/// # Example
/// ```rust,ignore
/// let (client_side, server_side) = InMemoryTransport::pair();
/// let response = client_side.send(invocation).await?; // Some(envelope)
/// ```
pub struct InMemoryTransport {
    local: Arc<Side>,
    peer: Arc<Side>,
    inbound_rx: Mutex<Option<UnboundedReceiver<Envelope>>>,
}

impl InMemoryTransport {
    /// Create two paired transports.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = unbounded_channel();
        let (b_tx, b_rx) = unbounded_channel();
        let side_a = Side::new("inmem-a", a_tx);
        let side_b = Side::new("inmem-b", b_tx);

        let a = Self {
            local: Arc::clone(&side_a),
            peer: Arc::clone(&side_b),
            inbound_rx: Mutex::new(Some(a_rx)),
        };
        let b = Self {
            local: side_b,
            peer: side_a,
            inbound_rx: Mutex::new(Some(b_rx)),
        };
        (a, b)
    }

    /// Number of calls currently awaiting a response on this side.
    pub fn pending_count(&self) -> usize {
        self.local.pending.len()
    }

    async fn send_invocation(&self, envelope: Envelope) -> Result<Option<Envelope>, TransportError> {
        let call_id = envelope.call_id().to_string();
        let (tx, rx) = oneshot::channel();
        self.local.pending.insert(call_id.clone(), tx);
        let guard = PendingGuard {
            side: Arc::clone(&self.local),
            call_id,
        };

        if !self.peer.deliver(envelope) {
            return Err(TransportError::Disconnected);
        }

        // The guard stays armed while we wait; dropping this future
        // un-registers the waiter so a late response is discarded.
        let response = rx.await.map_err(|_| TransportError::Disconnected)?;
        drop(guard);
        Ok(Some(response))
    }

    fn send_reply(&self, envelope: Envelope) -> Result<Option<Envelope>, TransportError> {
        let call_id = envelope.call_id().to_string();
        match self.peer.pending.remove(&call_id) {
            Some((_, waiter)) => {
                if waiter.send(envelope).is_err() {
                    warn!(call_id = %call_id, "response waiter gone; dropping reply");
                }
            }
            None => {
                warn!(call_id = %call_id, "no in-flight call for reply; dropping");
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, envelope: Envelope) -> Result<Option<Envelope>, TransportError> {
        if self.local.is_closed() {
            return Err(TransportError::Disconnected);
        }

        match envelope.message_type() {
            MessageType::Invocation => self.send_invocation(envelope).await,
            MessageType::Response | MessageType::Error => self.send_reply(envelope),
            MessageType::System => {
                if self.peer.deliver(envelope) {
                    Ok(None)
                } else {
                    Err(TransportError::Disconnected)
                }
            }
        }
    }

    async fn receive(&self) -> Result<UnboundedReceiver<Envelope>, TransportError> {
        self.inbound_rx
            .lock()
            .take()
            .ok_or(TransportError::IngressClaimed)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.local.closed.store(true, Ordering::SeqCst);
        // Ends our ingress stream and fails the peer's future deliveries.
        *self.local.inbound_tx.lock() = None;
        // Waiting calls observe Disconnected as their senders drop.
        self.local.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.local.is_closed() && !self.peer.is_closed()
    }

    fn metadata(&self) -> TransportMetadata {
        TransportMetadata {
            scheme: "inmem".to_string(),
            peer: self.peer.label.to_string(),
            connected_at: self.local.connected_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::serialization::Manifest;
    use crate::util::ActorId;
    use bytes::Bytes;
    use std::collections::HashMap;

    fn invocation(call_id: &str) -> Envelope {
        Envelope::invocation(
            ActorId::well_known("server"),
            Some(ActorId::well_known("client")),
            "ping",
            call_id,
            Manifest::void(),
            Bytes::new(),
            HashMap::new(),
        )
        .unwrap()
    }

    fn response(call_id: &str) -> Envelope {
        Envelope::response(
            ActorId::well_known("client"),
            Some(ActorId::well_known("server")),
            call_id,
            Manifest::void(),
            Bytes::new(),
            HashMap::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_response_matched_by_call_id() {
        let (client, server) = InMemoryTransport::pair();
        let mut ingress = server.receive().await.unwrap();

        let server_task = tokio::spawn(async move {
            let request = ingress.recv().await.unwrap();
            assert_eq!(request.target(), "ping");
            server.send(response(request.call_id())).await.unwrap();
        });

        let reply = client.send(invocation("call-1")).await.unwrap();
        let reply = reply.unwrap();
        assert_eq!(reply.call_id(), "call-1");
        assert_eq!(reply.message_type(), MessageType::Response);
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_uncorrelated_reply_is_dropped() {
        let (client, server) = InMemoryTransport::pair();
        let result = server.send(response("nobody-waits")).await.unwrap();
        assert!(result.is_none());
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_after_close_is_disconnected() {
        let (client, _server) = InMemoryTransport::pair();
        client.close().await.unwrap();

        let err = client.send(invocation("call-1")).await.unwrap_err();
        assert_eq!(err, TransportError::Disconnected);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (client, _server) = InMemoryTransport::pair();
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_close_ends_ingress_stream() {
        let (client, server) = InMemoryTransport::pair();
        let mut ingress = server.receive().await.unwrap();

        server.close().await.unwrap();
        drop(client);
        assert!(ingress.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_to_closed_peer_is_disconnected() {
        let (client, server) = InMemoryTransport::pair();
        server.close().await.unwrap();

        let err = client.send(invocation("call-1")).await.unwrap_err();
        assert_eq!(err, TransportError::Disconnected);
    }

    #[tokio::test]
    async fn test_ingress_claimed_once() {
        let (_client, server) = InMemoryTransport::pair();
        server.receive().await.unwrap();

        let err = server.receive().await.unwrap_err();
        assert_eq!(err, TransportError::IngressClaimed);
    }

    #[tokio::test]
    async fn test_dropped_send_unregisters_waiter() {
        let (client, server) = InMemoryTransport::pair();
        let mut ingress = server.receive().await.unwrap();

        {
            let send_fut = client.send(invocation("call-1"));
            tokio::pin!(send_fut);
            // Poll once so the envelope is delivered, then drop the future.
            let _ = futures::poll!(send_fut.as_mut());
        }

        let request = ingress.recv().await.unwrap();
        assert_eq!(client.pending_count(), 0);
        // The late reply is dropped without error.
        let result = server.send(response(request.call_id())).await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_metadata() {
        let (client, _server) = InMemoryTransport::pair();
        let metadata = client.metadata();
        assert_eq!(metadata.scheme, "inmem");
        assert_eq!(metadata.peer, "inmem-b");
    }
}
