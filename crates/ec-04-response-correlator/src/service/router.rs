//! # Response Router
//!
//! Observer that completes tracked requests and passes every other response
//! to a fallback observer.

use crate::domain::PendingRequestStore;
use crate::ports::ResponseObserver;
use shared_types::Response;
use std::sync::Arc;
use tracing::trace;

/// Routes responses to pending waiters first, then to `fallback`.
pub struct ResponseRouter {
    pending: Arc<PendingRequestStore>,
    fallback: Arc<dyn ResponseObserver>,
}

impl ResponseRouter {
    /// Create a router over `pending` with a generic fallback observer.
    pub fn new<O>(pending: Arc<PendingRequestStore>, fallback: O) -> Self
    where
        O: ResponseObserver + 'static,
    {
        Self {
            pending,
            fallback: Arc::new(fallback),
        }
    }

    /// The store tracked requests are completed in.
    #[must_use]
    pub fn pending(&self) -> &Arc<PendingRequestStore> {
        &self.pending
    }
}

impl ResponseObserver for ResponseRouter {
    fn on_response(&self, response: Response) {
        if let Err(response) = self.pending.complete(response) {
            trace!(request_id = %response.id, "No waiter, routing to fallback");
            self.fallback.on_response(response);
        }
    }
}
