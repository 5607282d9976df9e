//! Charge gateway HTTP entrypoint.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control the binding address
//! - `CHARGE_GATEWAY_CONFIG` points at the JSON configuration file
//! - `RUST_LOG` controls log verbosity

use charge_gateway::application::engine::ChargeEngine;
use charge_gateway::config::{CliArgs, GatewayConfig};
use charge_gateway::domain::ports::{DeclineCounterStoreBox, ProcessorClientBox};
use charge_gateway::infrastructure::http::ReqwestProcessorClient;
use charge_gateway::infrastructure::in_memory::InMemoryDeclineCounters;
use charge_gateway::interfaces::http::routes;
use charge_gateway::telemetry;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = GatewayConfig::load(&args).into_diagnostic()?;

    telemetry::init();

    let processor: ProcessorClientBox = Box::new(
        ReqwestProcessorClient::new(
            config.processor_base_url(),
            config.identifier(),
            config.request_timeout(),
        )
        .into_diagnostic()?,
    );
    let counters: DeclineCounterStoreBox = Box::new(InMemoryDeclineCounters::new());

    let registry = config.registry();
    for name in registry.unroutable() {
        warn!(provider = %name, "provider is enabled but has no adapter; charges will fail");
    }

    let engine = ChargeEngine::new(registry, processor, counters)
        .with_retry_policy(config.retry_policy());
    let app = routes(Arc::new(engine)).layer(TraceLayer::new_for_http());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    info!(%addr, processor = config.processor_base_url(), "charge gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    info!("charge gateway stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
