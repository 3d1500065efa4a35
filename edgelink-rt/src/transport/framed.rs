//! Length-delimited framed transport over a bidirectional byte stream.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{split, AsyncRead, AsyncWrite, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};
use tracing::error;
use url::Url;

// Layer 3: Internal module imports
use super::error::TransportError;
use super::tls::TlsConfig;
use super::traits::{Transport, TransportMetadata};
use crate::envelope::Envelope;

/// URL scheme for plaintext connections.
const SCHEME_PLAINTEXT: &str = "grpc";

/// URL scheme for TLS connections.
const SCHEME_TLS: &str = "grpcs";

/// Asynchronous transport carrying envelopes as length-delimited frames.
///
/// Works over any bidirectional byte stream; the framing layer preserves
/// envelope boundaries and in-order delivery per channel. Sends return
/// `None` immediately; responses arrive through the ingress stream and
/// are correlated by the call lifecycle manager.
///
/// A reader task decodes inbound frames into envelopes. A frame that
/// does not parse as an envelope is logged and terminates the
/// connection; envelopes are never silently dropped.
#[derive(Debug)]
pub struct FramedTransport<S> {
    writer: tokio::sync::Mutex<Option<FramedWrite<WriteHalf<S>, LengthDelimitedCodec>>>,
    inbound_rx: parking_lot::Mutex<Option<UnboundedReceiver<Envelope>>>,
    reader_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
    connected: Arc<AtomicBool>,
    metadata: TransportMetadata,
}

impl<S> FramedTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wrap an established byte stream.
    pub fn new(stream: S, metadata: TransportMetadata) -> Self {
        let (read_half, write_half) = split(stream);
        let writer = FramedWrite::new(write_half, LengthDelimitedCodec::new());
        let mut reader = FramedRead::new(read_half, LengthDelimitedCodec::new());

        let (inbound_tx, inbound_rx) = unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let reader_connected = Arc::clone(&connected);

        let reader_task = tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(bytes) => match Envelope::from_wire(&bytes) {
                        Ok(envelope) => {
                            if inbound_tx.send(envelope).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "inbound envelope parse failure; terminating connection");
                            break;
                        }
                    },
                    Err(e) => {
                        error!(error = %e, "framing failure on inbound stream");
                        break;
                    }
                }
            }
            reader_connected.store(false, Ordering::SeqCst);
        });

        Self {
            writer: tokio::sync::Mutex::new(Some(writer)),
            inbound_rx: parking_lot::Mutex::new(Some(inbound_rx)),
            reader_task: parking_lot::Mutex::new(Some(reader_task)),
            connected,
            metadata,
        }
    }
}

impl FramedTransport<TcpStream> {
    /// Dial a peer by transport URL.
    ///
    /// Accepts `grpc://host:port` for plaintext. `grpcs://` URLs and
    /// explicit [`TlsConfig`] values fail with `TlsUnsupported` because
    /// the embedded stack carries no TLS implementation; plugging in a
    /// TLS-capable stack means wrapping its stream with
    /// [`FramedTransport::new`].
    pub async fn connect(url: &str, tls: Option<&TlsConfig>) -> Result<Self, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        match parsed.scheme() {
            SCHEME_PLAINTEXT => {}
            SCHEME_TLS => {
                return Err(TransportError::TlsUnsupported(format!(
                    "scheme '{SCHEME_TLS}' requires a TLS-capable network stack"
                )));
            }
            other => {
                return Err(TransportError::InvalidUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        }

        if let Some(config) = tls {
            config
                .validate()
                .map_err(|e| TransportError::ConnectionFailed(format!("invalid TLS config: {e}")))?;
            return Err(TransportError::TlsUnsupported(
                "explicit TLS configuration requires a TLS-capable network stack".to_string(),
            ));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| TransportError::InvalidUrl("missing host".to_string()))?;
        let port = parsed
            .port()
            .ok_or_else(|| TransportError::InvalidUrl("missing port".to_string()))?;

        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(Self::new(
            stream,
            TransportMetadata::new(SCHEME_PLAINTEXT, format!("{host}:{port}")),
        ))
    }

    /// Wrap a stream accepted by a listening server.
    pub fn accept(stream: TcpStream, peer: impl Into<String>) -> Self {
        Self::new(stream, TransportMetadata::new(SCHEME_PLAINTEXT, peer))
    }
}

#[async_trait::async_trait]
impl<S> Transport for FramedTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + Sync + 'static,
{
    async fn send(&self, envelope: Envelope) -> Result<Option<Envelope>, TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }

        let bytes = envelope
            .to_wire()
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(TransportError::Disconnected)?;
        sink.send(Bytes::from(bytes))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        Ok(None)
    }

    async fn receive(&self) -> Result<UnboundedReceiver<Envelope>, TransportError> {
        self.inbound_rx
            .lock()
            .take()
            .ok_or(TransportError::IngressClaimed)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);

        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.close().await;
        }
        if let Some(task) = self.reader_task.lock().take() {
            task.abort();
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn metadata(&self) -> TransportMetadata {
        self.metadata.clone()
    }
}
