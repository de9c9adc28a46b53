//! Kubernetes resource watchers.
//!
//! Registers the reconciler with `kube_runtime::Controller`. Janusgraph CRs
//! are the primary trigger; Services and StatefulSets owned by a CR map back
//! to their owner, so a change to either child also re-runs reconciliation
//! for that CR. The runtime serialises reconciliations per object and
//! applies the error policy below between retries.

use crate::backoff::BackoffTracker;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::Janusgraph;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use kube::Api;
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::reflector::{Lookup, ObjectRef};
use kube_runtime::{Controller, watcher};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Server-side watch timeout in seconds.
///
/// Kept below the client read timeout so idle watches are closed by the API
/// server rather than timing out on the client.
const WATCH_TIMEOUT_SECS: u32 = 25;

/// Shared state handed to every reconciliation.
#[derive(Debug)]
pub struct Context {
    reconciler: Reconciler,
    backoff: BackoffTracker,
}

impl Context {
    /// Creates a context from a reconciler and its error backoff tracker.
    pub fn new(reconciler: Reconciler, backoff: BackoffTracker) -> Self {
        Self { reconciler, backoff }
    }

    /// Drops the error history of a CR the runtime reports as deleted.
    ///
    /// A CR deleted while failing is never reconciled again, so its entry
    /// would otherwise stay in the tracker.
    fn forget_deleted<K: Lookup + ?Sized>(&self, obj: &ObjectRef<K>) {
        self.backoff
            .reset(&backoff_key(obj.namespace.as_deref().unwrap_or_default(), &obj.name));
    }
}

fn backoff_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

fn object_key(obj: &Janusgraph) -> String {
    backoff_key(
        obj.metadata.namespace.as_deref().unwrap_or_default(),
        obj.metadata.name.as_deref().unwrap_or("<unknown>"),
    )
}

/// Reconcile entry point called by the runtime.
///
/// Only the object's identity is used; the reconciler re-reads everything.
async fn reconcile(obj: Arc<Janusgraph>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let name = obj
        .metadata
        .name
        .as_deref()
        .ok_or(ControllerError::MissingObjectKey(".metadata.name"))?;
    let namespace = obj
        .metadata
        .namespace
        .as_deref()
        .ok_or(ControllerError::MissingObjectKey(".metadata.namespace"))?;

    let outcome = ctx.reconciler.reconcile_janusgraph(namespace, name).await?;
    ctx.backoff.reset(&object_key(&obj));
    debug!("Janusgraph {}/{} reconciled: {:?}", namespace, name, outcome);
    Ok(outcome.action())
}

/// Error policy: requeue with per-object Fibonacci backoff.
fn error_policy(obj: Arc<Janusgraph>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = object_key(&obj);
    let delay = ctx.backoff.next_for(&key);
    error!(
        "Reconciliation error for Janusgraph {}: {}, retrying in {}s",
        key,
        error,
        delay.as_secs()
    );
    Action::requeue(delay)
}

/// Watches Janusgraph CRs and the objects they own.
#[derive(Debug)]
pub struct Watcher {
    context: Arc<Context>,
    janusgraph_api: Api<Janusgraph>,
    service_api: Api<Service>,
    stateful_set_api: Api<StatefulSet>,
    runtime_config: RuntimeConfig,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        context: Arc<Context>,
        janusgraph_api: Api<Janusgraph>,
        service_api: Api<Service>,
        stateful_set_api: Api<StatefulSet>,
        config: &ControllerConfig,
    ) -> Self {
        let runtime_config = RuntimeConfig::default()
            .debounce(config.debounce)
            .concurrency(config.concurrency);

        Self {
            context,
            janusgraph_api,
            service_api,
            stateful_set_api,
            runtime_config,
        }
    }

    /// Runs the Janusgraph controller until a shutdown signal is received.
    pub async fn watch_janusgraphs(&self) -> Result<(), ControllerError> {
        info!("Starting Janusgraph watcher");

        let watcher_config = || watcher::Config::default().timeout(WATCH_TIMEOUT_SECS);
        let context = Arc::clone(&self.context);

        Controller::new(self.janusgraph_api.clone(), watcher_config())
            .owns(self.service_api.clone(), watcher_config())
            .owns(self.stateful_set_api.clone(), watcher_config())
            .with_config(self.runtime_config.clone())
            .shutdown_on_signal()
            .run(reconcile, error_policy, Arc::clone(&self.context))
            .for_each(|res| {
                let context = Arc::clone(&context);
                async move {
                    match res {
                        Ok((obj, _)) => debug!("Reconciled Janusgraph {}", obj.name),
                        Err(kube_runtime::controller::Error::ObjectNotFound(obj)) => {
                            debug!("Janusgraph {} deleted before reconciliation", obj.name);
                            context.forget_deleted(&obj);
                        }
                        Err(e) => warn!("Janusgraph controller error: {}", e),
                    }
                }
            })
            .await;

        info!("Janusgraph watcher stopped");
        Ok(())
    }
}
