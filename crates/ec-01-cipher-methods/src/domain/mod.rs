//! # Domain Layer
//!
//! Registry logic and error types. No I/O.

pub mod errors;
pub mod registry;

pub use errors::{RegistryError, TransformError};
pub use registry::AlgorithmRegistry;
