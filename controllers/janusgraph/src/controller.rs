//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, object store, reconciler and watcher together for the
//! Janusgraph Controller.

use crate::backoff::BackoffTracker;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::store::KubeObjectStore;
use crate::watcher::{Context, Watcher};
use crds::Janusgraph;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for Janusgraph management.
#[derive(Debug)]
pub struct Controller {
    janusgraph_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts watching.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Janusgraph Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Create API clients, scoped to the watch namespace when one is configured
        let (janusgraph_api, service_api, stateful_set_api) = match config.namespace.as_deref() {
            Some(ns) => (
                Api::<Janusgraph>::namespaced(kube_client.clone(), ns),
                Api::<Service>::namespaced(kube_client.clone(), ns),
                Api::<StatefulSet>::namespaced(kube_client.clone(), ns),
            ),
            None => (
                Api::<Janusgraph>::all(kube_client.clone()),
                Api::<Service>::all(kube_client.clone()),
                Api::<StatefulSet>::all(kube_client.clone()),
            ),
        };

        // Create reconciler on top of the API server
        let reconciler = Reconciler::new(KubeObjectStore::new(kube_client));
        let context = Arc::new(Context::new(
            reconciler,
            BackoffTracker::new(config.backoff_min_secs, config.backoff_max_secs),
        ));

        let watcher = Watcher::new(
            context,
            janusgraph_api,
            service_api,
            stateful_set_api,
            &config,
        );

        // Start watcher in a background task
        let janusgraph_watcher = tokio::spawn(async move { watcher.watch_janusgraphs().await });

        Ok(Self { janusgraph_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Janusgraph Controller running");

        self.janusgraph_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("Janusgraph watcher panicked: {e}")))?
            .map_err(|e| ControllerError::Watch(format!("Janusgraph watcher error: {e}")))?;

        info!("Janusgraph Controller stopped");
        Ok(())
    }
}
