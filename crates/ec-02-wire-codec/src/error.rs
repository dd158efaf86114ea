//! Codec error types.

use thiserror::Error;

/// Errors from encoding or decoding envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The datagram is not a well-formed envelope.
    #[error("Malformed message: {reason}")]
    Malformed { reason: String },

    /// A configured text encoding name is not recognised.
    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),
}

impl CodecError {
    /// Build a `Malformed` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        CodecError::Malformed {
            reason: reason.into(),
        }
    }

    /// Returns true for structural decode failures.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, CodecError::Malformed { .. })
    }
}
