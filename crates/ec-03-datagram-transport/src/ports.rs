//! # Transport Port
//!
//! Abstract datagram channel between the client and the service.
//!
//! Delivery is best effort: a datagram may be lost, duplicated or reordered
//! and nothing here detects it.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Unreliable, unordered, connectionless message channel.
///
/// # Thread Safety
///
/// One task may `send` while another is blocked in `receive` on the same
/// instance; implementations need no external lock.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram to `peer`. Returns once the datagram is handed to
    /// the network, without any acknowledgement.
    async fn send(&self, bytes: &[u8], peer: SocketAddr) -> Result<(), TransportError>;

    /// Wait for the next datagram.
    ///
    /// Returns `TransportError::Closed` once `close` has been called, including
    /// for a call that was already waiting.
    async fn receive(&self) -> Result<(Vec<u8>, SocketAddr), TransportError>;

    /// Close the transport. Idempotent.
    fn close(&self);

    /// Returns true once `close` has been called.
    fn is_closed(&self) -> bool;

    /// Address this endpoint receives on.
    fn local_addr(&self) -> SocketAddr;
}

/// Errors from transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport was closed.
    #[error("transport closed")]
    Closed,

    /// Datagram exceeds the configured maximum size.
    #[error("datagram of {size} bytes exceeds maximum of {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// Peer address cannot be sent to.
    #[error("invalid peer address: {0}")]
    InvalidAddress(SocketAddr),

    /// Underlying socket error.
    #[error("I/O error ({kind:?}): {message}")]
    Io { kind: io::ErrorKind, message: String },
}

impl TransportError {
    /// Whether a receive loop should keep going after this error.
    ///
    /// Some platforms surface ICMP port-unreachable feedback from an earlier
    /// send as a receive error on UDP sockets.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransportError::Io {
                kind: io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset,
                ..
            }
        )
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        TransportError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
