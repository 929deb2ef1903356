//! Patient records server.
//!
//! Usage:
//!   patient-records [--database <file>] [--bind <addr>] [--busy-timeout-ms <ms>]

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use patient_records_core::PatientStore;
use patient_records_server::{api_router, Cli, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(Cli::parse());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = PatientStore::new(config.store);
    store
        .initialize()
        .with_context(|| format!("opening {}", store.config().database_path.display()))?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "patient records server listening");

    axum::serve(listener, api_router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
