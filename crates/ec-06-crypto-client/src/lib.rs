//! # Crypto Client Subsystem
//!
//! **Subsystem ID:** 6
//!
//! Command layer of the EasyCrypto client: parses user input into
//! `Command`s and runs them through a `ClientSession`.
//!
//! ## Example
//!
//! ```rust
//! use ec_06_crypto_client::Command;
//!
//! assert_eq!(
//!     Command::parse("encrypt rot13 Hello, World!").unwrap(),
//!     Command::Encrypt { method: "rot13".into(), text: "Hello, World!".into() },
//! );
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod command;
pub mod config;
pub mod session;

pub use command::{Command, CommandError, USAGE};
pub use config::{server_target, ClientConfig, DEFAULT_CLIENT_PORT, DEFAULT_SERVER_PORT};
pub use session::{format_response, ClientSession};
