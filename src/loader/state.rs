use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

/// A (re)load request, retained until the worker can honour it.
#[derive(Debug, Clone)]
pub(super) struct LoadRequest {
    /// Generation token distinguishing this attempt from its predecessors.
    pub(super) request_id: u64,
    pub(super) folder: PathBuf,
}

/// Coordinator state: the single source of truth for whether a scan is
/// active and what should happen once it stops.
#[derive(Debug)]
enum LoadState {
    Idle,
    Running {
        request_id: u64,
    },
    /// The active scan has been signalled to stop; `restart`, when present,
    /// is dispatched as soon as the worker reports back. Repeated requests
    /// overwrite it, so only the most recent restart target survives.
    CancelPending {
        request_id: u64,
        restart: Option<LoadRequest>,
    },
}

/// What the caller of [`LoadControl::request_load`] must do next.
pub(super) enum StartDecision {
    /// No scan was active; hand this request to the worker.
    Dispatch(LoadRequest),
    /// A scan is active; it has been signalled and the request parked.
    Deferred,
}

/// Shared coordination state between the requester context and the worker.
///
/// All transitions run under the mutex; the two atomics are the lock-free
/// views the hot paths read (the scanner polls `cancel` per file, the
/// consumer compares envelope ids against `accepted` per delivery).
pub(super) struct LoadControl {
    state: Mutex<StateInner>,
    /// Newest request id whose deliveries the consumer should accept.
    accepted: AtomicU64,
    /// Cooperative stop signal for the scan currently on the worker.
    cancel: AtomicBool,
}

#[derive(Debug)]
struct StateInner {
    state: LoadState,
    next_id: u64,
}

impl LoadControl {
    pub(super) fn new() -> Self {
        Self {
            state: Mutex::new(StateInner {
                state: LoadState::Idle,
                next_id: 0,
            }),
            accepted: AtomicU64::new(0),
            cancel: AtomicBool::new(false),
        }
    }

    /// Record a request for `folder`, cancelling and superseding any active
    /// scan. Never blocks beyond the state transition itself.
    pub(super) fn request_load(&self, folder: PathBuf) -> StartDecision {
        let mut inner = self.lock();
        inner.next_id += 1;
        let request = LoadRequest {
            request_id: inner.next_id,
            folder,
        };
        self.accepted
            .store(request.request_id, AtomicOrdering::Release);

        let (next, decision) = match std::mem::replace(&mut inner.state, LoadState::Idle) {
            LoadState::Idle => (
                LoadState::Running {
                    request_id: request.request_id,
                },
                StartDecision::Dispatch(request),
            ),
            LoadState::Running { request_id } => {
                self.cancel.store(true, AtomicOrdering::Release);
                (
                    LoadState::CancelPending {
                        request_id,
                        restart: Some(request),
                    },
                    StartDecision::Deferred,
                )
            }
            LoadState::CancelPending { request_id, .. } => (
                LoadState::CancelPending {
                    request_id,
                    restart: Some(request),
                },
                StartDecision::Deferred,
            ),
        };
        inner.state = next;
        decision
    }

    /// Cancel any active scan without scheduling a successor. Returns `true`
    /// when nothing was running and shutdown can proceed immediately.
    pub(super) fn request_stop(&self) -> bool {
        let mut inner = self.lock();
        let (next, idle) = match std::mem::replace(&mut inner.state, LoadState::Idle) {
            LoadState::Idle => (LoadState::Idle, true),
            LoadState::Running { request_id } => {
                self.cancel.store(true, AtomicOrdering::Release);
                (
                    LoadState::CancelPending {
                        request_id,
                        restart: None,
                    },
                    false,
                )
            }
            LoadState::CancelPending { request_id, .. } => {
                // Withdraw any parked restart and re-accept the running scan
                // so its terminal event still reaches the consumer.
                self.accepted.store(request_id, AtomicOrdering::Release);
                (
                    LoadState::CancelPending {
                        request_id,
                        restart: None,
                    },
                    false,
                )
            }
        };
        inner.state = next;
        idle
    }

    /// Invoked on the worker when a scan returns, however it ended. Resolves
    /// a parked restart even when the scan finished before observing its
    /// cancel signal, so a pending request is never lost to that race.
    pub(super) fn finish_scan(&self) -> Option<LoadRequest> {
        let mut inner = self.lock();
        // The signal belonged to the finished scan; clearing it under the
        // same lock keeps a cancel aimed at the successor from being lost.
        self.cancel.store(false, AtomicOrdering::Release);
        match std::mem::replace(&mut inner.state, LoadState::Idle) {
            LoadState::CancelPending {
                restart: Some(request),
                ..
            } => {
                inner.state = LoadState::Running {
                    request_id: request.request_id,
                };
                Some(request)
            }
            _ => None,
        }
    }

    /// Id of the most recent accepted request; deliveries tagged with any
    /// other id are stale.
    pub(super) fn accepted_id(&self) -> u64 {
        self.accepted.load(AtomicOrdering::Acquire)
    }

    /// Stop signal polled by the scanner between files and before flushes.
    pub(super) fn cancel_signal(&self) -> &AtomicBool {
        &self.cancel
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StateInner> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}
