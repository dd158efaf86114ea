//! # UDP Transport
//!
//! Production adapter over `tokio::net::UdpSocket`.
//!
//! The socket is shared through `Arc` so a clone can receive on one task
//! while the original sends on another. `close()` takes the socket out of the
//! shared slot and raises a watch flag that every pending `receive` selects
//! on. Once no I/O call holds a snapshot the port is free to bind again.

use crate::adapters::closed_signal;
use crate::config::TransportConfig;
use crate::ports::{Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, trace};

/// UDP datagram transport.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<Mutex<Option<Arc<UdpSocket>>>>,
    local_addr: SocketAddr,
    config: TransportConfig,
    closed: Arc<watch::Sender<bool>>,
}

impl UdpTransport {
    /// Bind a socket on `addr`. Port 0 picks an ephemeral port.
    ///
    /// # Errors
    ///
    /// `TransportError::Io` if the bind fails.
    pub async fn bind(addr: SocketAddr, config: TransportConfig) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        debug!(%local_addr, "UDP transport bound");

        let (closed, _) = watch::channel(false);
        Ok(Self {
            socket: Arc::new(Mutex::new(Some(Arc::new(socket)))),
            local_addr,
            config,
            closed: Arc::new(closed),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Socket for one I/O call, `Closed` once `close()` took it.
    fn socket(&self) -> Result<Arc<UdpSocket>, TransportError> {
        self.socket.lock().clone().ok_or(TransportError::Closed)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, bytes: &[u8], peer: SocketAddr) -> Result<(), TransportError> {
        let socket = self.socket()?;
        if bytes.len() > self.config.max_datagram_size {
            return Err(TransportError::MessageTooLarge {
                size: bytes.len(),
                max: self.config.max_datagram_size,
            });
        }
        if peer.port() == 0 || peer.ip().is_unspecified() {
            return Err(TransportError::InvalidAddress(peer));
        }

        let sent = socket.send_to(bytes, peer).await?;
        trace!(%peer, bytes = sent, "Datagram sent");
        Ok(())
    }

    async fn receive(&self) -> Result<(Vec<u8>, SocketAddr), TransportError> {
        let closed = self.closed.subscribe();
        let already_closed = *closed.borrow();
        if already_closed {
            return Err(TransportError::Closed);
        }
        let socket = self.socket()?;

        let mut buf = vec![0u8; self.config.recv_buffer_size];
        tokio::select! {
            () = closed_signal(closed) => Err(TransportError::Closed),
            result = socket.recv_from(&mut buf) => {
                let (len, peer) = result?;
                buf.truncate(len);
                trace!(%peer, bytes = len, "Datagram received");
                Ok((buf, peer))
            }
        }
    }

    fn close(&self) {
        drop(self.socket.lock().take());
        if !self.closed.send_replace(true) {
            debug!(local_addr = %self.local_addr, "UDP transport closed");
        }
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
