//! # Transport Adapters
//!
//! - `UdpTransport`: production socket.
//! - `MemoryTransport`: in-process endpoints for deterministic tests.

pub mod memory;
pub mod udp;

pub use memory::{MemoryNetwork, MemoryTransport};
pub use udp::UdpTransport;

use tokio::sync::watch;

/// Resolves once the close flag is raised or its sender is gone.
pub(crate) async fn closed_signal(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed {
            return;
        }
        if closed.changed().await.is_err() {
            return;
        }
    }
}
