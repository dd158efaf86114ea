//! Service configuration.
//!
//! Defaults, then an optional TOML file, then environment overrides:
//!
//! - `EC_BIND_ADDR`: listen address (default `0.0.0.0:10000`)
//! - `EC_TEXT_ENCODING`: `utf-16` (default) or `utf-8`

use ec_02_wire_codec::TextEncoding;
use ec_03_datagram_transport::{parse_override, ConfigError, TransportConfig};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port the service listens on by default.
pub const DEFAULT_SERVICE_PORT: u16 = 10_000;

/// Environment variable overriding `bind_addr`.
pub const ENV_BIND_ADDR: &str = "EC_BIND_ADDR";

/// Environment variable overriding `encoding`.
pub const ENV_TEXT_ENCODING: &str = "EC_TEXT_ENCODING";

/// Configuration of the crypto service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address to receive requests on.
    pub bind_addr: SocketAddr,
    /// Text encoding of datagrams. Must match the clients.
    pub encoding: TextEncoding,
    /// Datagram size limits.
    pub transport: TransportConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_SERVICE_PORT),
            encoding: TextEncoding::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Defaults with environment overrides applied.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None, |key| std::env::var(key).ok())
    }

    /// An optional TOML document, then overrides from `lookup`.
    ///
    /// # Errors
    ///
    /// As for [`from_toml_str`](Self::from_toml_str) and
    /// [`apply_overrides`](Self::apply_overrides).
    pub fn load<F>(toml: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match toml {
            Some(text) => Self::from_toml_str(text)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Parse from a TOML document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` on invalid TOML, `ConfigError::InvalidValue` for
    /// inconsistent transport limits.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.transport.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by variable name.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` naming the offending variable.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = parse_override(ENV_BIND_ADDR, lookup(ENV_BIND_ADDR))? {
            self.bind_addr = addr;
        }
        if let Some(encoding) = parse_override(ENV_TEXT_ENCODING, lookup(ENV_TEXT_ENCODING))? {
            self.encoding = encoding;
        }
        Ok(())
    }
}
