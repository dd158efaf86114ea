//! # EasyCrypto Test Suite
//!
//! Cross-crate tests that run a real `RequestDispatcher` against a real
//! `ClientSession`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs       # service + client wiring over any transport
//!     ├── flows.rs         # request/response flows over MemoryTransport
//!     └── udp_loopback.rs  # the same flows over real UDP sockets
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ec-tests
//! cargo test -p ec-tests integration::udp_loopback
//! ```

#![allow(dead_code)]

pub mod integration;
