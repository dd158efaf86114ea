//! # Request Dispatcher
//!
//! Service receive loop: datagram → request → `CryptoService` → response,
//! sent back to whichever address the request came from.
//!
//! ## Malformed Input
//!
//! A datagram that fails to decode is answered with `InvalidRequest` when its
//! `id` and `operation` can still be read, so the client is not left waiting.
//! Anything less structured is dropped with a warning. Responses arriving at
//! the service are dropped, never answered.

use crate::service::CryptoService;
use ec_02_wire_codec::MessageCodec;
use ec_03_datagram_transport::{Transport, TransportError};
use shared_types::{Envelope, Response, ResultCode};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Running counters of a dispatcher.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Requests decoded and handled.
    pub requests_handled: AtomicU64,
    /// Malformed requests answered with `InvalidRequest`.
    pub invalid_replies: AtomicU64,
    /// Datagrams dropped without a reply.
    pub dropped: AtomicU64,
    /// Replies that could not be sent.
    pub send_errors: AtomicU64,
}

/// Serves requests from one transport until closed or shut down.
pub struct RequestDispatcher<T: Transport> {
    transport: Arc<T>,
    codec: MessageCodec,
    service: Arc<CryptoService>,
    shutdown: Option<watch::Receiver<bool>>,
    stats: DispatcherStats,
}

impl<T: Transport> RequestDispatcher<T> {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(transport: Arc<T>, codec: MessageCodec, service: Arc<CryptoService>) -> Self {
        Self {
            transport,
            codec,
            service,
            shutdown: None,
            stats: DispatcherStats::default(),
        }
    }

    /// Stop `run` when this flag turns true or its sender is dropped.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Running counters.
    #[must_use]
    pub fn stats(&self) -> &DispatcherStats {
        &self.stats
    }

    /// Serve until the transport closes or shutdown is signalled.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the loop if it was neither
    /// `Closed` nor recoverable.
    #[instrument(skip(self), name = "request_dispatcher", fields(local_addr = %self.transport.local_addr()))]
    pub async fn run(&self) -> Result<(), TransportError> {
        info!("Dispatcher started, waiting for requests");

        loop {
            let received = tokio::select! {
                biased;
                () = shutdown_requested(self.shutdown.clone()) => {
                    info!("Shutdown signal received");
                    return Ok(());
                }
                received = self.transport.receive() => received,
            };

            match received {
                Ok((bytes, peer)) => {
                    if let Some(response) = self.dispatch(&bytes, peer) {
                        match self.reply(&response, peer).await {
                            Err(TransportError::Closed) => return Ok(()),
                            Err(e) => {
                                self.stats.send_errors.fetch_add(1, Ordering::Relaxed);
                                warn!(%peer, request_id = %response.id, error = %e, "Failed to send response");
                            }
                            Ok(()) => {}
                        }
                    }
                }
                Err(TransportError::Closed) => {
                    info!("Transport closed, dispatcher exiting");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Recoverable transport error");
                }
                Err(e) => {
                    error!(error = %e, "Transport failed, dispatcher exiting");
                    return Err(e);
                }
            }
        }
    }

    /// Decide the reply to one datagram, if any.
    fn dispatch(&self, bytes: &[u8], peer: SocketAddr) -> Option<Response> {
        match self.codec.decode(bytes) {
            Ok(Envelope::Request(request)) => {
                debug!(
                    request_id = %request.id,
                    operation = %request.operation,
                    method = request.method_name(),
                    %peer,
                    "Request received"
                );
                self.stats.requests_handled.fetch_add(1, Ordering::Relaxed);
                Some(self.service.handle(&request))
            }
            Ok(Envelope::Response(response)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(%peer, request_id = %response.id, "Dropping response sent to service");
                None
            }
            Err(e) => match self.codec.peek_header(bytes) {
                Some((id, operation)) => {
                    self.stats.invalid_replies.fetch_add(1, Ordering::Relaxed);
                    warn!(%peer, request_id = %id, error = %e, "Answering malformed request");
                    Some(Response {
                        id,
                        operation,
                        result: ResultCode::InvalidRequest,
                        data: e.to_string(),
                    })
                }
                None => {
                    self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(%peer, bytes = bytes.len(), error = %e, "Dropping malformed datagram");
                    None
                }
            },
        }
    }

    async fn reply(&self, response: &Response, peer: SocketAddr) -> Result<(), TransportError> {
        let bytes = self.codec.encode_response(response);
        self.transport.send(&bytes, peer).await?;
        debug!(
            request_id = %response.id,
            result = response.result.code(),
            %peer,
            "Response sent"
        );
        Ok(())
    }
}

impl<T: Transport> std::fmt::Debug for RequestDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("local_addr", &self.transport.local_addr())
            .field("encoding", &self.codec.encoding())
            .finish()
    }
}

/// Resolves when shutdown is signalled; never without a receiver.
async fn shutdown_requested(shutdown: Option<watch::Receiver<bool>>) {
    let Some(mut shutdown) = shutdown else {
        return std::future::pending().await;
    };
    loop {
        let raised = *shutdown.borrow_and_update();
        if raised || shutdown.changed().await.is_err() {
            return;
        }
    }
}
