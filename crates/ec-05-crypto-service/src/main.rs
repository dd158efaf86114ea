//! # EasyCrypto Server
//!
//! UDP front end of the crypto service.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging from the environment
//! 2. Load configuration (`EC_CONFIG` TOML file, then environment overrides)
//! 3. Bind the UDP socket and register the built-in cipher methods
//! 4. Serve until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info, Instrument};

use ec_02_wire_codec::MessageCodec;
use ec_03_datagram_transport::{Transport, UdpTransport};
use ec_05_crypto_service::{CryptoService, RequestDispatcher, ServiceConfig};
use ec_telemetry::{init_logging, service_span, TelemetryConfig};

/// Load configuration from an optional file and the environment.
fn load_config() -> Result<ServiceConfig> {
    let Ok(path) = std::env::var("EC_CONFIG") else {
        return ServiceConfig::from_env().context("Invalid environment override");
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {path}"))?;
    ServiceConfig::load(Some(&text), |key| std::env::var(key).ok())
        .with_context(|| format!("Invalid configuration from {path} and environment"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::for_service("crypto-server");
    init_logging(&telemetry).context("Failed to initialize logging")?;
    serve().instrument(service_span(&telemetry)).await
}

async fn serve() -> Result<()> {
    let config = load_config()?;

    let transport = Arc::new(
        UdpTransport::bind(config.bind_addr, config.transport.clone())
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?,
    );
    let service = Arc::new(CryptoService::with_defaults());

    info!("===========================================");
    info!("  EasyCrypto Server v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        local_addr = %transport.local_addr(),
        encoding = %config.encoding,
        methods = ?service.registry().list_names(),
        "Service configured"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = RequestDispatcher::new(
        Arc::clone(&transport),
        MessageCodec::new(config.encoding),
        service,
    )
    .with_shutdown(shutdown_rx);
    let mut serving = tokio::spawn(async move { dispatcher.run().await }.in_current_span());

    info!("Service is running. Press Ctrl+C to stop.");
    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            None
        }
        finished = &mut serving => Some(finished),
    };

    let outcome = match finished {
        Some(outcome) => outcome,
        None => {
            info!("Initiating graceful shutdown...");
            shutdown_tx.send_replace(true);
            transport.close();
            serving.await
        }
    };

    match outcome.context("Dispatcher task panicked")? {
        Ok(()) => info!("Shutdown complete"),
        Err(e) => {
            error!(error = %e, "Dispatcher stopped with error");
            return Err(e.into());
        }
    }

    Ok(())
}
