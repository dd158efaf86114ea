//! Correlator lifecycle state and counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of a `ResponseCorrelator`.
///
/// ```text
/// Idle ──start──▶ Listening ──stop / transport closed──▶ Stopped
///   └──────────────────stop──────────────────────────────▲
/// ```
///
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelatorState {
    /// Created, not yet listening.
    Idle,
    /// Listener and consumer tasks are running.
    Listening,
    /// Shut down for good.
    Stopped,
}

impl fmt::Display for CorrelatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelatorState::Idle => write!(f, "idle"),
            CorrelatorState::Listening => write!(f, "listening"),
            CorrelatorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Running counters of a correlator.
#[derive(Debug, Default)]
pub struct CorrelatorStats {
    /// Datagrams read from the transport.
    pub datagrams_received: AtomicU64,
    /// Responses handed to the observer.
    pub responses_delivered: AtomicU64,
    /// Datagrams that failed to decode as a response.
    pub malformed_datagrams: AtomicU64,
    /// Transport errors seen by the listener.
    pub transport_errors: AtomicU64,
}

impl CorrelatorStats {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> CorrelatorStatsSnapshot {
        CorrelatorStatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            responses_delivered: self.responses_delivered.load(Ordering::Relaxed),
            malformed_datagrams: self.malformed_datagrams.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of `CorrelatorStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelatorStatsSnapshot {
    pub datagrams_received: u64,
    pub responses_delivered: u64,
    pub malformed_datagrams: u64,
    pub transport_errors: u64,
}
