//! # Crypto Service Subsystem
//!
//! **Subsystem ID:** 5
//!
//! Server side of EasyCrypto. `RequestDispatcher` reads requests from a
//! `Transport`, `CryptoService` answers them from an `AlgorithmRegistry`.
//!
//! ## Example
//!
//! ```rust
//! use ec_05_crypto_service::CryptoService;
//! use shared_types::{Request, RequestId, ResultCode};
//!
//! let service = CryptoService::with_defaults();
//!
//! let ok = service.handle(&Request::encrypt(RequestId::new(0), "rot13", "Hello, World!"));
//! assert_eq!(ok.data, "Uryyb, Jbeyq!");
//!
//! let missing = service.handle(&Request::decrypt(RequestId::new(1), "unknown-cipher", "x"));
//! assert_eq!(missing.result, ResultCode::UnknownMethod);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod dispatcher;
pub mod service;

pub use config::{ServiceConfig, DEFAULT_SERVICE_PORT};
pub use dispatcher::{DispatcherStats, RequestDispatcher};
pub use service::CryptoService;
