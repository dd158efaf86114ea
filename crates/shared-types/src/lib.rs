//! # Shared Types Crate
//!
//! This crate contains the envelope types exchanged between the EasyCrypto
//! client and service.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Request`, `Response` and their identifiers
//!   are defined here and nowhere else.
//! - **Value Objects**: envelopes are plain owned values; whichever layer holds
//!   one owns it.
//! - **Wire-Agnostic**: serialization to bytes lives in `ec-02-wire-codec`.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::*;
pub use errors::*;
