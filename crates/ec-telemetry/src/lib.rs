//! # EasyCrypto Telemetry
//!
//! Structured logging for the EasyCrypto binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ec_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_service("crypto-server");
//! init_logging(&config)?;
//! serve().instrument(service_span(&config)).await
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `EC_JSON_LOGS` | `false` | JSON output |
//! | `EC_SERVICE_NAME` | binary name | Service name on the root span |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, service_span};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}
