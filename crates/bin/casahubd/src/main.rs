//! # casahubd — casahub daemon
//!
//! Composition root that wires the capability providers into the hub and
//! starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize tracing
//! - Register capability providers and validate the capability table
//!   against the enabled families
//! - Assemble the hub context, run the initial discovery pass, start
//!   autofind
//! - Build the axum router, bind, and serve
//! - Handle graceful shutdown (SIGINT), draining any in-flight pass
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no hub logic belongs here.

mod config;

use std::sync::Arc;

use casahub_adapter_http_axum::router;
use casahub_adapter_http_axum::state::AppState;
use casahub_adapter_virtual::{VirtualLightProvider, VirtualPlugProvider};
use casahub_app::hub::{Hub, HubConfig};
use casahub_app::table::CapabilityTable;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Capability providers. The virtual providers stand in for real
    // wire-protocol adapters; a kasa or wiz adapter crate would register
    // here the same way.
    let table = CapabilityTable::builder()
        .register(Arc::new(VirtualPlugProvider::default()))
        .register(Arc::new(VirtualLightProvider::default()))
        .build(&config.hub.families)?;

    let hub = Arc::new(Hub::new(
        table,
        HubConfig {
            broadcast: config.hub.broadcast,
            call_timeout: config.call_timeout(),
        },
    ));

    // Populate the catalog once before accepting requests.
    let report = hub.refresh().await;
    tracing::info!(
        elapsed_ms = report.elapsed_ms,
        families = report.families.len(),
        "initial discovery pass finished"
    );

    if config.autofind.enabled {
        hub.start_autofind(config.autofind_interval()).await;
    }

    let app = router::build(AppState::new(Arc::clone(&hub)));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "casahubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop autofind and wait for any in-flight pass before exiting.
    hub.shutdown().await;
    tracing::info!("casahubd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
