//! Error types for cipher methods and the registry.

use thiserror::Error;

/// A cipher method could not process its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} could not transform input: {reason}")]
pub struct TransformError {
    /// Name of the method that failed.
    pub method: String,
    /// Human-readable reason, sent back to the client as the diagnostic.
    pub reason: String,
}

impl TransformError {
    /// Create a new transform error.
    pub fn new(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No method is registered under this name.
    #[error("Method not supported: {name}")]
    NotFound { name: String },
}
