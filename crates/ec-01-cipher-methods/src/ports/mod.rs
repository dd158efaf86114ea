//! # Cipher Port
//!
//! The capability contract every cipher method implements. The service only
//! ever talks to methods through this trait, so adding a method means adding
//! one implementing type and registering it.

use crate::domain::TransformError;

/// Result of a single encrypt or decrypt call.
pub type CipherOutcome = Result<String, TransformError>;

/// A named, stateless text transform.
///
/// # Contract
///
/// - `encrypt` and `decrypt` operate on text, not raw bytes.
/// - Neither may panic for any input, including the empty string. Inputs the
///   method cannot process are reported as `Err(TransformError)`.
/// - For every input `x` accepted by `encrypt`,
///   `decrypt(&encrypt(x)?) == x`.
/// - Calls are referentially transparent: the same input always yields the
///   same output.
/// - `name()` is stable for the lifetime of the instance; it is the registry key.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one registry can serve
/// concurrent requests without locking.
pub trait CipherAlgorithm: Send + Sync {
    /// Registry key of this method, e.g. `"rot13"`.
    fn name(&self) -> &str;

    /// Transform plaintext into ciphertext.
    fn encrypt(&self, plaintext: &str) -> CipherOutcome;

    /// Transform ciphertext back into plaintext.
    fn decrypt(&self, ciphertext: &str) -> CipherOutcome;
}

impl std::fmt::Debug for dyn CipherAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherAlgorithm")
            .field("name", &self.name())
            .finish()
    }
}
