//! # Observer Port
//!
//! The callback through which the correlator hands decoded responses to the
//! application.

use shared_types::Response;

/// Receives every response the correlator decodes, in arrival order.
///
/// Called from the correlator's consumer task, one response at a time.
/// A slow observer delays later responses but never the receive loop.
pub trait ResponseObserver: Send + Sync {
    /// Handle one response.
    fn on_response(&self, response: Response);
}

impl<F> ResponseObserver for F
where
    F: Fn(Response) + Send + Sync,
{
    fn on_response(&self, response: Response) {
        self(response);
    }
}
