//! Janusgraph Controller
//!
//! Keeps a JanusGraph deployment in place for every `Janusgraph` CR.
//!
//! For each CR the controller creates a Service (`<name>-service`, port
//! 8182) and then a StatefulSet (`<name>`) running
//! `janusgraph/janusgraph:<spec.version>` with `spec.size` replicas. Both
//! are owned by the CR and removed by Kubernetes garbage collection when it
//! is deleted. Existing objects are never modified.

mod backoff;
mod config;
mod controller;
mod error;
mod ownership;
mod reconciler;
mod resources;
mod store;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube's rustls transport needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed");
    }

    info!("Starting Janusgraph Controller");

    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {}s", config.debounce.as_secs());
    info!(
        "  Error backoff: {}s..{}s",
        config.backoff_min_secs, config.backoff_max_secs
    );

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
