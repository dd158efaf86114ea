//! # Cipher Method Adapters
//!
//! Concrete implementations of the `CipherAlgorithm` port.

pub mod reverse;
pub mod shift;

pub use reverse::ReverseCipher;
pub use shift::ShiftCipher;

use crate::domain::AlgorithmRegistry;

impl AlgorithmRegistry {
    /// Registry holding every built-in method: `rot13`, `caesar`, `reverse`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ShiftCipher::rot13());
        registry.register(ShiftCipher::caesar());
        registry.register(ReverseCipher::new());
        registry
    }
}
