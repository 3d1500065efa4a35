//! The completion handle awaited by a remote call.

// Layer 1: Standard library imports
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

// Layer 2: Third-party crate imports
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use crate::envelope::Envelope;
use crate::system::errors::RpcError;

/// How one in-flight call ended: the correlated Response or Error
/// envelope, or a typed local failure (timeout, cancellation, shutdown).
pub type CallOutcome = Result<Envelope, RpcError>;

/// Awaits the outcome of one registered call.
///
/// The handle resolves exactly once and may be awaited from any task.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<CallOutcome>,
}

impl CompletionHandle {
    pub(crate) fn new(rx: oneshot::Receiver<CallOutcome>) -> Self {
        Self { rx }
    }
}

impl Future for CompletionHandle {
    type Output = CallOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|result| match result {
            Ok(outcome) => outcome,
            // The manager vanished without resolving; treat as cancelled.
            Err(_) => Err(RpcError::Cancelled),
        })
    }
}
