//! # Error Types
//!
//! Errors produced while building envelope values.

use thiserror::Error;

/// An operation name that is not one of `capabilities`, `encrypt`, `decrypt`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation: {0:?}")]
pub struct ParseOperationError(pub String);
