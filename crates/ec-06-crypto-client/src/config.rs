//! Client configuration.
//!
//! Defaults, then an optional TOML file, then environment overrides:
//!
//! - `EC_CLIENT_BIND`: local address (default `0.0.0.0:10001`)
//! - `EC_SERVER_ADDR`: service address (default `127.0.0.1:10000`)
//! - `EC_TEXT_ENCODING`: `utf-16` (default) or `utf-8`

use ec_02_wire_codec::TextEncoding;
use ec_03_datagram_transport::{parse_override, ConfigError, TransportConfig};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port the client binds by default.
pub const DEFAULT_CLIENT_PORT: u16 = 10_001;

/// Port of the service when an address omits it.
pub const DEFAULT_SERVER_PORT: u16 = 10_000;

/// Environment variable overriding `bind_addr`.
pub const ENV_CLIENT_BIND: &str = "EC_CLIENT_BIND";

/// Environment variable overriding `server_addr`.
pub const ENV_SERVER_ADDR: &str = "EC_SERVER_ADDR";

/// Environment variable overriding `encoding`.
pub const ENV_TEXT_ENCODING: &str = "EC_TEXT_ENCODING";

/// Configuration of the crypto client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Local address responses are received on.
    pub bind_addr: SocketAddr,
    /// Address of the crypto service.
    pub server_addr: SocketAddr,
    /// Text encoding of datagrams. Must match the service.
    pub encoding: TextEncoding,
    /// Datagram size limits.
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_CLIENT_PORT),
            server_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_SERVER_PORT),
            encoding: TextEncoding::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
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
        if let Some(addr) = parse_override(ENV_CLIENT_BIND, lookup(ENV_CLIENT_BIND))? {
            self.bind_addr = addr;
        }
        if let Some(addr) = parse_override(ENV_SERVER_ADDR, lookup(ENV_SERVER_ADDR))? {
            self.server_addr = addr;
        }
        if let Some(encoding) = parse_override(ENV_TEXT_ENCODING, lookup(ENV_TEXT_ENCODING))? {
            self.encoding = encoding;
        }
        Ok(())
    }
}

/// Turn a `host[:port]` argument into a resolvable `host:port` target.
///
/// Bare IP literals, IPv6 included, get [`DEFAULT_SERVER_PORT`]; so do
/// bracketed IPv6 literals without a port and host names without one.
#[must_use]
pub fn server_target(arg: &str) -> String {
    if arg.parse::<SocketAddr>().is_ok() {
        return arg.to_string();
    }
    let unbracketed = arg
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(arg);
    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_SERVER_PORT).to_string();
    }
    if arg.contains(':') {
        arg.to_string()
    } else {
        format!("{arg}:{DEFAULT_SERVER_PORT}")
    }
}
