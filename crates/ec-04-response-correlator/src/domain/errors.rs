//! Error types for the correlator and the issuer.

use ec_03_datagram_transport::TransportError;
use shared_types::Operation;
use thiserror::Error;

/// Errors from correlator lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelatorError {
    /// `start` was called while already listening.
    #[error("correlator already started")]
    AlreadyStarted,

    /// The correlator is stopped and cannot be restarted.
    #[error("correlator stopped")]
    Stopped,
}

/// Errors from issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueError {
    /// Encrypt/decrypt issued without a method name. No id was consumed.
    #[error("{operation} request requires a method")]
    MissingMethod { operation: Operation },

    /// `issue_tracked` on an issuer built without a pending store.
    #[error("issuer has no pending request store")]
    NotTracking,

    /// The datagram could not be sent.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
