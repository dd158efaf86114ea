//! # Response Correlator Subsystem
//!
//! **Subsystem ID:** 4
//!
//! Client side of the request/response protocol. Requests are issued
//! fire-and-forget; responses come back asynchronously and are matched to
//! requests only by the `id` they carry.
//!
//! ## Architecture
//!
//! ```text
//!  caller ──▶ RequestIssuer ──encode──▶ Transport ──▶ service
//!                                          │
//!  observer ◀── consumer ◀── mpsc ◀── listener (decode)
//! ```
//!
//! The issuer and the correlator share one `Arc<Transport>`: one sends, the
//! other receives, with no lock between them.
//!
//! ## Optional Matching
//!
//! `PendingRequestStore` + `ResponseRouter` give callers a per-request
//! `oneshot` receiver. Responses without a waiter fall through to a generic
//! observer. There are no retries and no timeouts in the core.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    CorrelatorError, CorrelatorState, CorrelatorStats, CorrelatorStatsSnapshot, IssueError,
    PendingRequestStore, PendingStats,
};
pub use ports::ResponseObserver;
pub use service::{RequestIssuer, ResponseCorrelator, ResponseRouter, DEFAULT_CHANNEL_CAPACITY};
