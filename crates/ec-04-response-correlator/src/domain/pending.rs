//! # Pending Request Store
//!
//! Optional caller-side matching of responses to the requests that caused
//! them. The correlator itself delivers every response to one observer; a
//! caller that wants to await a specific id registers it here and routes the
//! observer through `ResponseRouter`.
//!
//! Flow:
//! 1. Issuer assigns a `RequestId`
//! 2. Issuer calls `register()` *before* sending and keeps the receiver
//! 3. Correlator decodes the response and the router calls `complete()`
//! 4. Caller awaits the receiver, typically under `tokio::time::timeout`
//!
//! Nothing is retried. `remove_expired` only drops bookkeeping for requests
//! whose response never arrived.

use dashmap::DashMap;
use shared_types::{Operation, RequestId, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A request waiting for its response.
struct PendingRequest {
    /// Channel to hand over the response
    sender: oneshot::Sender<Response>,
    /// When the request was registered
    created_at: Instant,
    /// Operation of the request (for logging)
    operation: Operation,
    /// How long to keep the entry
    timeout: Duration,
}

/// Statistics for the pending request store.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests completed
    pub total_completed: AtomicU64,
    /// Total requests expired
    pub total_timeouts: AtomicU64,
    /// Total requests cancelled or whose receiver was dropped
    pub total_cancelled: AtomicU64,
}

/// Map of in-flight request ids to waiting receivers.
pub struct PendingRequestStore {
    pending: DashMap<RequestId, PendingRequest>,
    default_timeout: Duration,
    stats: Arc<PendingStats>,
}

impl std::fmt::Debug for PendingRequestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequestStore")
            .field("pending", &self.pending.len())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl PendingRequestStore {
    /// Create a store whose entries expire after `default_timeout`.
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            default_timeout,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register `id` and get a receiver for its response.
    ///
    /// Registering an id that is already pending replaces the old waiter,
    /// whose receiver then resolves with an error.
    pub fn register(
        &self,
        id: RequestId,
        operation: Operation,
        timeout: Option<Duration>,
    ) -> oneshot::Receiver<Response> {
        let (tx, rx) = oneshot::channel();

        let request = PendingRequest {
            sender: tx,
            created_at: Instant::now(),
            operation,
            timeout: timeout.unwrap_or(self.default_timeout),
        };

        if self.pending.insert(id, request).is_some() {
            warn!(request_id = %id, "Request id already pending, replacing waiter");
        }
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(request_id = %id, operation = %operation, "Registered pending request");

        rx
    }

    /// Hand a response to its waiter.
    ///
    /// # Errors
    ///
    /// Gives the response back if no waiter exists for its id or the waiter
    /// has dropped its receiver.
    pub fn complete(&self, response: Response) -> Result<(), Response> {
        let Some((id, pending)) = self.pending.remove(&response.id) else {
            debug!(request_id = %response.id, "Response for unknown or expired request id");
            return Err(response);
        };

        if pending.operation != response.operation {
            warn!(
                request_id = %id,
                expected = %pending.operation,
                actual = %response.operation,
                "Response operation differs from request"
            );
        }

        let response_time = pending.created_at.elapsed();
        match pending.sender.send(response) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %id,
                    operation = %pending.operation,
                    response_time_ms = response_time.as_millis(),
                    "Completed pending request"
                );
                Ok(())
            }
            Err(response) => {
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(request_id = %id, "Pending request receiver dropped");
                Err(response)
            }
        }
    }

    /// Remove expired requests.
    ///
    /// Returns the number of requests removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, request| {
            let elapsed = now.duration_since(request.created_at);
            if elapsed > request.timeout {
                warn!(
                    request_id = %id,
                    operation = %request.operation,
                    elapsed_ms = elapsed.as_millis(),
                    timeout_ms = request.timeout.as_millis(),
                    "Removing expired pending request"
                );
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    /// Number of currently pending requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Statistics.
    #[must_use]
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    /// Check if an id is pending.
    #[must_use]
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// Cancel a pending request. Returns false if it was not pending.
    pub fn cancel(&self, id: &RequestId) -> bool {
        if self.pending.remove(id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }
}
