//! The in-flight call lifecycle manager.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::handle::{CallOutcome, CompletionHandle};
use crate::envelope::Envelope;
use crate::metrics::{names, namespaced, MetricsSink};
use crate::system::errors::RpcError;

/// Interval between in-flight checks while draining.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Lifecycle phases. Transitions are one-way:
/// `Running → Draining → Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Accepting new call registrations
    Running,
    /// Rejecting new calls, waiting for in-flight to settle
    Draining,
    /// All calls resolved or cancelled; no further use
    Terminated,
}

impl Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("Running"),
            Self::Draining => f.write_str("Draining"),
            Self::Terminated => f.write_str("Terminated"),
        }
    }
}

/// One outstanding remote call.
struct InFlightCall {
    completion: oneshot::Sender<CallOutcome>,
    timeout_task: JoinHandle<()>,
    started_at: Instant,
}

/// Phase and call map, mutated only under one lock.
struct ManagerState {
    phase: LifecyclePhase,
    calls: HashMap<String, InFlightCall>,
}

struct ManagerShared {
    state: Mutex<ManagerState>,
    phase_tx: watch::Sender<LifecyclePhase>,
    metrics: Arc<dyn MetricsSink>,
    gauge_in_flight: String,
    counter_timeouts: String,
    histogram_latency: String,
    histogram_drain: String,
}

impl ManagerShared {
    /// Resolve one call under the lock; unknown ids are logged and
    /// ignored (the call already timed out or was cancelled).
    fn resolve(&self, call_id: &str, outcome: CallOutcome) {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.calls.remove(call_id);
            if removed.is_some() {
                self.metrics
                    .record_gauge(&self.gauge_in_flight, state.calls.len() as u64);
            }
            removed
        };

        match removed {
            Some(call) => {
                call.timeout_task.abort();
                let latency_ms = call.started_at.elapsed().as_secs_f64() * 1000.0;
                self.metrics
                    .record_histogram(&self.histogram_latency, latency_ms);
                if call.completion.send(outcome).is_err() {
                    debug!(call_id = %call_id, "completion receiver dropped before resolution");
                }
            }
            None => {
                warn!(call_id = %call_id, "late completion for unknown call; dropping");
            }
        }
    }

    /// Timeout expiry path; re-checks membership under the lock so a
    /// response racing the timer resolves the call at most once.
    fn expire(&self, call_id: &str) {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.calls.remove(call_id);
            if removed.is_some() {
                self.metrics
                    .record_gauge(&self.gauge_in_flight, state.calls.len() as u64);
            }
            removed
        };

        if let Some(call) = removed {
            self.metrics.increment_counter(&self.counter_timeouts, 1);
            warn!(call_id = %call_id, "call timed out");
            let _ = call.completion.send(Err(RpcError::Timeout {
                call_id: call_id.to_string(),
            }));
        }
    }
}

/// Tracks in-flight client-side calls keyed by call id.
///
/// Every registered call terminates via exactly one of success, failure,
/// timeout, or cancellation; the same completion handle is never
/// resolved twice. All state mutation is serialized under one mutex;
/// timeout callbacks take the same lock and re-check membership before
/// firing.
///
/// Must be used within a Tokio runtime: registration spawns the per-call
/// timeout task.
#[derive(Clone)]
pub struct CallLifecycleManager {
    shared: Arc<ManagerShared>,
}

impl CallLifecycleManager {
    /// Create a manager in the `Running` phase.
    pub fn new(metrics_namespace: &str, metrics: Arc<dyn MetricsSink>) -> Self {
        let (phase_tx, _) = watch::channel(LifecyclePhase::Running);
        Self {
            shared: Arc::new(ManagerShared {
                state: Mutex::new(ManagerState {
                    phase: LifecyclePhase::Running,
                    calls: HashMap::new(),
                }),
                phase_tx,
                metrics,
                gauge_in_flight: namespaced(metrics_namespace, names::IN_FLIGHT),
                counter_timeouts: namespaced(metrics_namespace, names::TIMEOUTS),
                histogram_latency: namespaced(metrics_namespace, names::CALL_LATENCY_MS),
                histogram_drain: namespaced(metrics_namespace, names::DRAIN_DURATION_MS),
            }),
        }
    }

    /// Register a call and schedule its timeout.
    ///
    /// A zero timeout fires on the next scheduling turn; it never blocks
    /// the caller indefinitely.
    ///
    /// # Errors
    ///
    /// `SystemShutDown` unless the manager is `Running`.
    pub fn register(
        &self,
        call_id: &str,
        call_timeout: Duration,
    ) -> Result<CompletionHandle, RpcError> {
        let mut state = self.shared.state.lock();
        if state.phase != LifecyclePhase::Running {
            return Err(RpcError::SystemShutDown);
        }

        let (tx, rx) = oneshot::channel();
        let timeout_task = tokio::spawn({
            let shared = Arc::clone(&self.shared);
            let call_id = call_id.to_string();
            async move {
                sleep(call_timeout).await;
                shared.expire(&call_id);
            }
        });

        state.calls.insert(
            call_id.to_string(),
            InFlightCall {
                completion: tx,
                timeout_task,
                started_at: Instant::now(),
            },
        );
        self.shared
            .metrics
            .record_gauge(&self.shared.gauge_in_flight, state.calls.len() as u64);

        Ok(CompletionHandle::new(rx))
    }

    /// Resolve a call with its correlated Response or Error envelope.
    ///
    /// A call id with no in-flight entry (already timed out or
    /// cancelled) is logged and ignored.
    pub fn succeed(&self, call_id: &str, envelope: Envelope) {
        self.shared.resolve(call_id, Ok(envelope));
    }

    /// Resolve a call with a failure.
    pub fn fail(&self, call_id: &str, error: RpcError) {
        self.shared.resolve(call_id, Err(error));
    }

    /// Fail every in-flight call with the given reason and clear state.
    pub fn cancel_all(&self, reason: RpcError) {
        let drained: Vec<(String, InFlightCall)> = {
            let mut state = self.shared.state.lock();
            let drained = state.calls.drain().collect();
            self.shared.metrics.record_gauge(&self.shared.gauge_in_flight, 0);
            drained
        };

        for (call_id, call) in drained {
            call.timeout_task.abort();
            debug!(call_id = %call_id, "cancelling in-flight call");
            let _ = call.completion.send(Err(reason.clone()));
        }
    }

    /// Drain in-flight calls: `Running → Draining`, wait until the
    /// in-flight count reaches zero or the deadline elapses, then cancel
    /// the rest with `SystemShutDown` and terminate.
    pub async fn drain(&self, deadline: Duration) {
        let started = Instant::now();
        {
            let mut state = self.shared.state.lock();
            match state.phase {
                LifecyclePhase::Running => {
                    state.phase = LifecyclePhase::Draining;
                    let _ = self.shared.phase_tx.send(LifecyclePhase::Draining);
                }
                LifecyclePhase::Draining => {}
                LifecyclePhase::Terminated => return,
            }
        }

        let _ = timeout(deadline, self.wait_for_idle()).await;
        self.cancel_all(RpcError::SystemShutDown);

        {
            let mut state = self.shared.state.lock();
            state.phase = LifecyclePhase::Terminated;
            let _ = self.shared.phase_tx.send(LifecyclePhase::Terminated);
        }

        let drain_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.shared
            .metrics
            .record_histogram(&self.shared.histogram_drain, drain_ms);
    }

    async fn wait_for_idle(&self) {
        loop {
            if self.in_flight_count() == 0 {
                break;
            }
            sleep(DRAIN_POLL_INTERVAL).await;
        }
    }

    /// Number of calls currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.shared.state.lock().calls.len()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.shared.state.lock().phase
    }

    /// Observe phase transitions.
    pub fn phase_stream(&self) -> watch::Receiver<LifecyclePhase> {
        self.shared.phase_tx.subscribe()
    }
}
