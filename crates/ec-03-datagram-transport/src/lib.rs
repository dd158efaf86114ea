//! # Datagram Transport Subsystem
//!
//! **Subsystem ID:** 3
//!
//! Unreliable datagram channel shared by the client and the service.
//!
//! ## Architecture
//!
//! - **Ports Layer:** the async `Transport` trait and `TransportError`
//! - **Adapters Layer:** `UdpTransport` (production), `MemoryTransport` (tests)
//! - **Config:** `TransportConfig` size limits and the shared `ConfigError`
//!
//! ## Guarantees
//!
//! None beyond best effort. Lost datagrams are not detected, large payloads
//! are rejected rather than fragmented.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod config;
pub mod ports;

pub use adapters::{MemoryNetwork, MemoryTransport, UdpTransport};
pub use config::{parse_override, ConfigError, TransportConfig, MAX_UDP_PAYLOAD};
pub use ports::{Transport, TransportError};
