//! Transport configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest UDP payload over IPv4 (65535 - 8 byte UDP header - 20 byte IP header).
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Default receive buffer size.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 65_536;

/// Datagram size limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Largest datagram `send` accepts.
    pub max_datagram_size: usize,
    /// Size of the buffer each `receive` reads into.
    pub recv_buffer_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_datagram_size: MAX_UDP_PAYLOAD,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl TransportConfig {
    /// Parse from a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` on invalid TOML, `ConfigError::InvalidValue` if the
    /// limits are inconsistent.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the limits.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if `max_datagram_size` is zero or above
    /// [`MAX_UDP_PAYLOAD`], or the receive buffer is smaller than it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_datagram_size == 0 || self.max_datagram_size > MAX_UDP_PAYLOAD {
            return Err(ConfigError::invalid(
                "max_datagram_size",
                self.max_datagram_size,
                format!("must be between 1 and {MAX_UDP_PAYLOAD}"),
            ));
        }
        if self.recv_buffer_size < self.max_datagram_size {
            return Err(ConfigError::invalid(
                "recv_buffer_size",
                self.recv_buffer_size,
                "must not be smaller than max_datagram_size",
            ));
        }
        Ok(())
    }
}

/// Configuration loading errors, shared by every EasyCrypto config struct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The document could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A field or environment variable holds an unusable value.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// Build an `InvalidValue` error.
    pub fn invalid(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse an optional override (environment variable, CLI flag) for `key`.
///
/// # Errors
///
/// `ConfigError::InvalidValue` naming `key` if the value does not parse.
pub fn parse_override<V>(key: &str, value: Option<String>) -> Result<Option<V>, ConfigError>
where
    V: FromStr,
    V::Err: fmt::Display,
{
    value
        .map(|raw| {
            raw.trim()
                .parse::<V>()
                .map_err(|e| ConfigError::invalid(key, &raw, e.to_string()))
        })
        .transpose()
}
