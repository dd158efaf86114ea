//! # Request Issuer
//!
//! Foreground half of the client: builds requests, assigns ids and sends
//! them without waiting for an answer. Responses arrive later through the
//! `ResponseCorrelator`.
//!
//! Ids come from a per-session `AtomicU64` starting at 0, so concurrent
//! callers never share an id and ids are never reused within a session.

use crate::domain::{IssueError, PendingRequestStore};
use ec_02_wire_codec::MessageCodec;
use ec_03_datagram_transport::Transport;
use shared_types::{Operation, Request, RequestId, Response};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Sends requests to one service address.
pub struct RequestIssuer<T: Transport> {
    transport: Arc<T>,
    codec: MessageCodec,
    peer: SocketAddr,
    next_id: AtomicU64,
    pending: Option<Arc<PendingRequestStore>>,
}

impl<T: Transport> RequestIssuer<T> {
    /// Create an issuer sending to `peer`. The first id issued is 0.
    #[must_use]
    pub fn new(transport: Arc<T>, codec: MessageCodec, peer: SocketAddr) -> Self {
        Self {
            transport,
            codec,
            peer,
            next_id: AtomicU64::new(0),
            pending: None,
        }
    }

    /// Enable `issue_tracked` through `store`.
    #[must_use]
    pub fn with_pending(mut self, store: Arc<PendingRequestStore>) -> Self {
        self.pending = Some(store);
        self
    }

    /// Address requests are sent to.
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The id the next request will receive.
    #[must_use]
    pub fn peek_next_id(&self) -> RequestId {
        RequestId::new(self.next_id.load(Ordering::SeqCst))
    }

    /// Ask the service for its supported method names.
    ///
    /// # Errors
    ///
    /// `IssueError::Transport` if the datagram cannot be sent.
    pub async fn capabilities(&self) -> Result<RequestId, IssueError> {
        self.issue(Operation::Capabilities, None, "").await
    }

    /// Ask the service to encrypt `data` with `method`.
    ///
    /// # Errors
    ///
    /// `IssueError::MissingMethod` for an empty method name,
    /// `IssueError::Transport` if the datagram cannot be sent.
    pub async fn encrypt(&self, method: &str, data: &str) -> Result<RequestId, IssueError> {
        self.issue(Operation::Encrypt, Some(method), data).await
    }

    /// Ask the service to decrypt `data` with `method`.
    ///
    /// # Errors
    ///
    /// As for [`encrypt`](Self::encrypt).
    pub async fn decrypt(&self, method: &str, data: &str) -> Result<RequestId, IssueError> {
        self.issue(Operation::Decrypt, Some(method), data).await
    }

    /// Issue any operation and return its id without awaiting the response.
    ///
    /// `method` is ignored for capabilities.
    ///
    /// # Errors
    ///
    /// `IssueError::MissingMethod` (before an id is consumed) or
    /// `IssueError::Transport`.
    pub async fn issue(
        &self,
        operation: Operation,
        method: Option<&str>,
        data: &str,
    ) -> Result<RequestId, IssueError> {
        let request = self.build(operation, method, data)?;
        self.send(&request).await?;
        Ok(request.id)
    }

    /// Issue an operation and get a receiver resolving with its response.
    ///
    /// The id is registered before the datagram is sent, so a fast response
    /// cannot miss its waiter. The receiver errors if the entry expires or is
    /// cancelled; nothing is retried.
    ///
    /// # Errors
    ///
    /// `IssueError::NotTracking` without a pending store, otherwise as for
    /// [`issue`](Self::issue). A failed send cancels the registration.
    pub async fn issue_tracked(
        &self,
        operation: Operation,
        method: Option<&str>,
        data: &str,
        timeout: Option<Duration>,
    ) -> Result<(RequestId, oneshot::Receiver<Response>), IssueError> {
        let store = self.pending.as_ref().ok_or(IssueError::NotTracking)?;
        let request = self.build(operation, method, data)?;

        let rx = store.register(request.id, request.operation, timeout);
        if let Err(e) = self.send(&request).await {
            store.cancel(&request.id);
            return Err(e);
        }
        Ok((request.id, rx))
    }

    fn build(
        &self,
        operation: Operation,
        method: Option<&str>,
        data: &str,
    ) -> Result<Request, IssueError> {
        let method = if operation.requires_method() {
            match method {
                Some(name) if !name.is_empty() => Some(name.to_string()),
                _ => return Err(IssueError::MissingMethod { operation }),
            }
        } else {
            None
        };

        let id = RequestId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(Request {
            id,
            operation,
            method,
            data: data.to_string(),
        })
    }

    async fn send(&self, request: &Request) -> Result<(), IssueError> {
        let bytes = self.codec.encode_request(request);
        self.transport.send(&bytes, self.peer).await?;
        debug!(
            request_id = %request.id,
            operation = %request.operation,
            method = request.method_name(),
            peer = %self.peer,
            "Request sent"
        );
        Ok(())
    }
}

impl<T: Transport> std::fmt::Debug for RequestIssuer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestIssuer")
            .field("peer", &self.peer)
            .field("next_id", &self.peek_next_id())
            .field("tracking", &self.pending.is_some())
            .finish()
    }
}
