//! # EasyCrypto Client
//!
//! Interactive client. Each input line is one command (see `help`);
//! requests are sent immediately and responses are printed whenever they
//! arrive, possibly after the next prompt.
//!
//! Usage: `crypto-client [server-host[:port]]`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::io::BufReader;
use tracing::Instrument;

use ec_02_wire_codec::MessageCodec;
use ec_03_datagram_transport::UdpTransport;
use ec_06_crypto_client::{format_response, server_target, ClientConfig, ClientSession, USAGE};
use ec_telemetry::{init_logging, service_span, TelemetryConfig};
use shared_types::Response;

/// Load configuration from an optional file and the environment.
fn load_config() -> Result<ClientConfig> {
    let Ok(path) = std::env::var("EC_CONFIG") else {
        return ClientConfig::from_env().context("Invalid environment override");
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {path}"))?;
    ClientConfig::load(Some(&text), |key| std::env::var(key).ok())
        .with_context(|| format!("Invalid configuration from {path} and environment"))
}

/// Resolve a `host[:port]` argument; the port defaults to the service port.
async fn resolve_server(arg: &str) -> Result<SocketAddr> {
    let target = server_target(arg);
    let addr = tokio::net::lookup_host(&target)
        .await
        .with_context(|| format!("Failed to resolve {target}"))?
        .next()
        .ok_or_else(|| anyhow!("No address found for {target}"));
    addr
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::for_service("crypto-client");
    init_logging(&telemetry).context("Failed to initialize logging")?;
    interact().instrument(service_span(&telemetry)).await
}

async fn interact() -> Result<()> {
    let mut config = load_config()?;
    if let Some(arg) = std::env::args().nth(1) {
        config.server_addr = resolve_server(&arg).await?;
    }

    let transport = Arc::new(
        UdpTransport::bind(config.bind_addr, config.transport.clone())
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?,
    );
    let session = ClientSession::new(
        transport,
        MessageCodec::new(config.encoding),
        config.server_addr,
    );
    session
        .start(|response: Response| println!("{}\n", format_response(&response)))
        .context("Failed to start response listener")?;

    println!("Welcome to the EasyCrypto client! Service: {}", config.server_addr);
    println!("{USAGE}\n");

    session
        .run_lines(BufReader::new(tokio::io::stdin()))
        .await
        .context("Failed to read input")
}
