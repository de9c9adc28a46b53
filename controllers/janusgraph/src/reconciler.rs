//! Reconciliation logic for Janusgraph CRDs.
//!
//! Each call re-reads the CR and its two children and takes at most one
//! step toward the desired state:
//!
//! 1. CR gone: nothing to do, owned objects are garbage collected.
//! 2. Service missing: create it and requeue, so the StatefulSet step runs
//!    against a fresh read.
//! 3. StatefulSet missing: create it from the CR as read in this call.
//! 4. Both present: steady state.
//!
//! A create rejected because the object already exists counts as found.
//! Existing children are never updated. Changing `spec.size` or
//! `spec.version` after the StatefulSet exists has no effect.

use crate::error::ControllerError;
use crate::ownership::set_controller_owner;
use crate::resources::{build_service, build_stateful_set, service_name, stateful_set_name};
use crate::store::{ObjectStore, StoreError};
use crds::Janusgraph;
use kube_runtime::controller::Action;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The CR no longer exists
    DeclarationGone,
    /// The Service was created; requeue
    ServiceCreated,
    /// The StatefulSet was created
    StatefulSetCreated,
    /// Both children exist; nothing was written by this controller
    Ready,
}

impl ReconcileOutcome {
    /// Scheduler action for this outcome.
    pub fn action(self) -> Action {
        match self {
            Self::ServiceCreated => Action::requeue(Duration::ZERO),
            Self::DeclarationGone | Self::StatefulSetCreated | Self::Ready => Action::await_change(),
        }
    }
}

/// Reconciles Janusgraph resources.
pub struct Reconciler {
    store: Box<dyn ObjectStore>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler on top of `store`.
    pub fn new(store: impl ObjectStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Reconciles the Janusgraph CR identified by `namespace`/`name`.
    ///
    /// Only the identity is used; the CR and its children are always
    /// re-read, whatever event triggered the call.
    pub async fn reconcile_janusgraph(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReconcileOutcome, ControllerError> {
        debug!("Reconciling Janusgraph {}/{}", namespace, name);

        let janusgraph = match self.store.get_janusgraph(namespace, name).await {
            Ok(jg) => jg,
            Err(StoreError::NotFound(_)) => {
                info!(
                    "Janusgraph {}/{} not found, ignoring since it must have been deleted",
                    namespace, name
                );
                return Ok(ReconcileOutcome::DeclarationGone);
            }
            Err(e) => {
                error!("Failed to get Janusgraph {}/{}: {}", namespace, name, e);
                return Err(e.into());
            }
        };

        if !self.ensure_service(&janusgraph, namespace, name).await? {
            return Ok(ReconcileOutcome::ServiceCreated);
        }

        if !self.ensure_stateful_set(&janusgraph, namespace, name).await? {
            return Ok(ReconcileOutcome::StatefulSetCreated);
        }

        debug!("Janusgraph {}/{} is up to date", namespace, name);
        Ok(ReconcileOutcome::Ready)
    }

    /// Returns `true` if the Service exists without this call having created it.
    ///
    /// A create rejected with AlreadyExists counts as found: another writer got there first.
    async fn ensure_service(
        &self,
        janusgraph: &Janusgraph,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ControllerError> {
        let svc_name = service_name(name);

        debug!("Checking for Service {}/{}", namespace, svc_name);
        match self.store.get_service(namespace, &svc_name).await {
            Ok(_) => return Ok(true),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => {
                error!("Failed to get Service {}/{}: {}", namespace, svc_name, e);
                return Err(e.into());
            }
        }

        let mut service = build_service(janusgraph)?;
        service.metadata.namespace = Some(namespace.to_string());
        set_controller_owner(&mut service.metadata, janusgraph)?;

        info!("Creating Service {}/{}", namespace, svc_name);
        match self.store.create_service(namespace, &service).await {
            Ok(_) => {
                info!("Service {}/{} created, requeuing", namespace, svc_name);
                Ok(false)
            }
            Err(StoreError::AlreadyExists(_)) => {
                warn!("Service {}/{} was created concurrently", namespace, svc_name);
                Ok(true)
            }
            Err(e) => {
                error!("Failed to create Service {}/{}: {}", namespace, svc_name, e);
                Err(e.into())
            }
        }
    }

    /// Returns `true` if the StatefulSet exists without this call having created it.
    async fn ensure_stateful_set(
        &self,
        janusgraph: &Janusgraph,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ControllerError> {
        let sts_name = stateful_set_name(name);

        debug!("Checking for StatefulSet {}/{}", namespace, sts_name);
        match self.store.get_stateful_set(namespace, &sts_name).await {
            Ok(_) => return Ok(true),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => {
                error!("Failed to get StatefulSet {}/{}: {}", namespace, sts_name, e);
                return Err(e.into());
            }
        }

        let mut stateful_set = build_stateful_set(janusgraph)?;
        stateful_set.metadata.namespace = Some(namespace.to_string());
        set_controller_owner(&mut stateful_set.metadata, janusgraph)?;

        info!(
            "Creating StatefulSet {}/{} ({} replicas, version {})",
            namespace, sts_name, janusgraph.spec.size, janusgraph.spec.version
        );
        match self.store.create_stateful_set(namespace, &stateful_set).await {
            Ok(_) => {
                info!("StatefulSet {}/{} created", namespace, sts_name);
                Ok(false)
            }
            Err(StoreError::AlreadyExists(_)) => {
                warn!("StatefulSet {}/{} was created concurrently", namespace, sts_name);
                Ok(true)
            }
            Err(e) => {
                error!("Failed to create StatefulSet {}/{}: {}", namespace, sts_name, e);
                Err(e.into())
            }
        }
    }
}
