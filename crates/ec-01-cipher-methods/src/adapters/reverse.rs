//! Character-order reversal. Applying it twice yields the input.

use crate::ports::{CipherAlgorithm, CipherOutcome};

/// The `reverse` method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseCipher;

impl ReverseCipher {
    /// Create the method.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CipherAlgorithm for ReverseCipher {
    fn name(&self) -> &str {
        "reverse"
    }

    fn encrypt(&self, plaintext: &str) -> CipherOutcome {
        Ok(plaintext.chars().rev().collect())
    }

    fn decrypt(&self, ciphertext: &str) -> CipherOutcome {
        self.encrypt(ciphertext)
    }
}
