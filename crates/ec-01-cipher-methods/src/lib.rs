//! # Cipher Methods Subsystem
//!
//! **Subsystem ID:** 1
//!
//! Pluggable cipher methods and the registry the service resolves them from.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Ports Layer:** the `CipherAlgorithm` capability contract
//! - **Domain Layer:** `AlgorithmRegistry` and error types
//! - **Adapters Layer:** concrete methods (`ShiftCipher`, `ReverseCipher`)
//!
//! ## Example
//!
//! ```rust
//! use ec_01_cipher_methods::{AlgorithmRegistry, CipherAlgorithm};
//!
//! let registry = AlgorithmRegistry::with_defaults();
//! let rot13 = registry.resolve("rot13").unwrap();
//!
//! let secret = rot13.encrypt("Hello, World!").unwrap();
//! assert_eq!(secret, "Uryyb, Jbeyq!");
//! assert_eq!(rot13.decrypt(&secret).unwrap(), "Hello, World!");
//!
//! assert!(registry.resolve("unknown-cipher").is_err());
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{ReverseCipher, ShiftCipher};
pub use domain::{AlgorithmRegistry, RegistryError, TransformError};
pub use ports::{CipherAlgorithm, CipherOutcome};
