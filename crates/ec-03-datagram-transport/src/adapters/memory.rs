//! # In-Memory Transport
//!
//! Endpoints attached to a shared `MemoryNetwork`, delivering datagrams over
//! unbounded tokio channels. Delivery is immediate and in order, which makes
//! client/service tests deterministic while keeping datagram semantics:
//! sending to an unknown or closed address silently drops the datagram.

use crate::adapters::closed_signal;
use crate::config::TransportConfig;
use crate::ports::{Transport, TransportError};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::trace;

type Datagram = (Vec<u8>, SocketAddr);

/// First port handed out for `bind` requests with port 0.
const EPHEMERAL_PORT_BASE: u16 = 49_152;

/// Ports in `49152..=65535`.
const EPHEMERAL_PORT_COUNT: u16 = u16::MAX - EPHEMERAL_PORT_BASE + 1;

#[derive(Debug)]
struct NetworkInner {
    endpoints: DashMap<SocketAddr, mpsc::UnboundedSender<Datagram>>,
    next_ephemeral: AtomicU16,
}

/// A shared address space for `MemoryTransport` endpoints.
#[derive(Debug, Clone)]
pub struct MemoryNetwork {
    inner: Arc<NetworkInner>,
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNetwork {
    /// Create an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NetworkInner {
                endpoints: DashMap::new(),
                next_ephemeral: AtomicU16::new(EPHEMERAL_PORT_BASE),
            }),
        }
    }

    /// Attach an endpoint at `addr`. Port 0 picks a free ephemeral port.
    ///
    /// # Errors
    ///
    /// `TransportError::Io` with kind `AddrInUse` if an open endpoint already
    /// holds the address.
    pub fn bind(
        &self,
        addr: SocketAddr,
        config: TransportConfig,
    ) -> Result<MemoryTransport, TransportError> {
        let addr = if addr.port() == 0 {
            self.ephemeral(addr.ip())
        } else {
            addr
        };

        let (tx, rx) = mpsc::unbounded_channel();
        match self.inner.endpoints.entry(addr) {
            Entry::Occupied(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::AddrInUse,
                    format!("{addr} already bound"),
                )
                .into())
            }
            Entry::Vacant(slot) => {
                slot.insert(tx.clone());
            }
        }

        let (closed, _) = watch::channel(false);
        Ok(MemoryTransport {
            local_addr: addr,
            network: self.clone(),
            own_sender: tx,
            inbox: Mutex::new(rx),
            closed,
            config,
        })
    }

    /// Number of open endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.inner.endpoints.len()
    }

    fn ephemeral(&self, ip: IpAddr) -> SocketAddr {
        loop {
            let raw = self.inner.next_ephemeral.fetch_add(1, Ordering::Relaxed);
            let port = EPHEMERAL_PORT_BASE + raw % EPHEMERAL_PORT_COUNT;
            let candidate = SocketAddr::new(ip, port);
            if !self.inner.endpoints.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// One endpoint on a `MemoryNetwork`.
///
/// Share it between a sending and a receiving task through `Arc`.
#[derive(Debug)]
pub struct MemoryTransport {
    local_addr: SocketAddr,
    network: MemoryNetwork,
    own_sender: mpsc::UnboundedSender<Datagram>,
    inbox: Mutex<mpsc::UnboundedReceiver<Datagram>>,
    closed: watch::Sender<bool>,
    config: TransportConfig,
}

impl MemoryTransport {
    /// Two connected loopback endpoints on a fresh network.
    ///
    /// # Errors
    ///
    /// Never fails on a fresh network; the `Result` mirrors `MemoryNetwork::bind`.
    pub fn pair() -> Result<(MemoryTransport, MemoryTransport), TransportError> {
        let network = MemoryNetwork::new();
        let any = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let a = network.bind(any, TransportConfig::default())?;
        let b = network.bind(any, TransportConfig::default())?;
        Ok((a, b))
    }

    /// The network this endpoint is attached to.
    #[must_use]
    pub fn network(&self) -> &MemoryNetwork {
        &self.network
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, bytes: &[u8], peer: SocketAddr) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if bytes.len() > self.config.max_datagram_size {
            return Err(TransportError::MessageTooLarge {
                size: bytes.len(),
                max: self.config.max_datagram_size,
            });
        }

        let delivered = self
            .network
            .inner
            .endpoints
            .get(&peer)
            .is_some_and(|tx| tx.send((bytes.to_vec(), self.local_addr)).is_ok());
        trace!(%peer, bytes = bytes.len(), delivered, "Datagram sent");
        Ok(())
    }

    async fn receive(&self) -> Result<(Vec<u8>, SocketAddr), TransportError> {
        let closed = self.closed.subscribe();
        let already_closed = *closed.borrow();
        if already_closed {
            return Err(TransportError::Closed);
        }

        tokio::select! {
            () = closed_signal(closed) => Err(TransportError::Closed),
            datagram = async { self.inbox.lock().await.recv().await } => {
                datagram.ok_or(TransportError::Closed)
            }
        }
    }

    fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        self.network
            .inner
            .endpoints
            .remove_if(&self.local_addr, |_, tx| tx.same_channel(&self.own_sender));
        trace!(local_addr = %self.local_addr, "Memory transport closed");
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_pair_delivers_in_order() {
        let (a, b) = MemoryTransport::pair().unwrap();
        assert_ne!(a.local_addr(), b.local_addr());

        for msg in [&b"one"[..], b"two", b"three"] {
            a.send(msg, b.local_addr()).await.unwrap();
        }
        for expected in [&b"one"[..], b"two", b"three"] {
            let (bytes, from) = b.receive().await.unwrap();
            assert_eq!(bytes, expected);
            assert_eq!(from, a.local_addr());
        }
    }

    #[tokio::test]
    async fn test_unknown_peer_drops_silently() {
        let (a, _b) = MemoryTransport::pair().unwrap();
        let nowhere: SocketAddr = "127.0.0.1:9".parse().unwrap();
        assert!(a.send(b"lost", nowhere).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_unblocks_receive_and_unregisters() {
        let (a, b) = MemoryTransport::pair().unwrap();
        let network = a.network().clone();
        let b = Arc::new(b);
        let receiver = Arc::clone(&b);
        let pending = tokio::spawn(async move { receiver.receive().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        b.close();
        b.close();

        let result = timeout(Duration::from_secs(5), pending).await.unwrap().unwrap();
        assert_eq!(result, Err(TransportError::Closed));
        assert_eq!(network.endpoint_count(), 1);

        // sending to the closed endpoint is a silent drop
        assert!(a.send(b"late", b.local_addr()).await.is_ok());
        assert_eq!(b.send(b"x", a.local_addr()).await, Err(TransportError::Closed));
    }

    #[tokio::test]
    async fn test_bind_conflict_and_rebind_after_drop() {
        let network = MemoryNetwork::new();
        let addr: SocketAddr = "127.0.0.1:10000".parse().unwrap();

        let first = network.bind(addr, TransportConfig::default()).unwrap();
        let err = network.bind(addr, TransportConfig::default()).unwrap_err();
        assert!(matches!(err, TransportError::Io { kind: io::ErrorKind::AddrInUse, .. }));

        drop(first);
        assert!(network.bind(addr, TransportConfig::default()).is_ok());
    }

    #[test]
    fn test_ephemeral_ports_wrap_within_range() {
        let network = MemoryNetwork::new();
        network.inner.next_ephemeral.store(u16::MAX, Ordering::Relaxed);
        let any: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let last = network.bind(any, TransportConfig::default()).unwrap();
        let wrapped = network.bind(any, TransportConfig::default()).unwrap();
        let next = network.bind(any, TransportConfig::default()).unwrap();

        assert_eq!(last.local_addr().port(), u16::MAX);
        assert_eq!(wrapped.local_addr().port(), EPHEMERAL_PORT_BASE);
        assert_eq!(next.local_addr().port(), EPHEMERAL_PORT_BASE + 1);
    }

    #[tokio::test]
    async fn test_oversized_datagram_rejected() {
        let network = MemoryNetwork::new();
        let config = TransportConfig {
            max_datagram_size: 4,
            ..TransportConfig::default()
        };
        let a = network.bind("127.0.0.1:0".parse().unwrap(), config).unwrap();
        let b = network
            .bind("127.0.0.1:0".parse().unwrap(), TransportConfig::default())
            .unwrap();
        assert_eq!(
            a.send(b"12345", b.local_addr()).await,
            Err(TransportError::MessageTooLarge { size: 5, max: 4 })
        );
    }
}
