//! Object store access for the reconciler.
//!
//! The reconciler never talks to `kube::Api` directly. It is handed an
//! [`ObjectStore`] at construction time, which keeps the decision logic
//! testable against the in-memory mock in `test_utils`.

use crds::Janusgraph;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use kube::api::PostParams;
use kube::{Api, Client};
use thiserror::Error;

/// Field manager recorded on objects this controller creates.
pub const FIELD_MANAGER: &str = "janusgraph-controller";

/// Errors returned by [`ObjectStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A create raced with another writer and lost
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Any other API server or transport failure
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl StoreError {
    /// Classifies a `kube::Error` for the object `what`.
    pub fn classify(what: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => Self::NotFound(what.to_string()),
            kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
                Self::AlreadyExists(what.to_string())
            }
            other => Self::Kube(other),
        }
    }
}

/// Read/create operations the reconciler needs against the cluster.
///
/// Only `get` and `create` are exposed: the controller never updates or
/// deletes the objects it owns.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a Janusgraph CR by namespace and name.
    async fn get_janusgraph(&self, namespace: &str, name: &str) -> Result<Janusgraph, StoreError>;

    /// Fetch a Service by namespace and name.
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, StoreError>;
    /// Create a Service in `namespace`.
    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, StoreError>;

    /// Fetch a StatefulSet by namespace and name.
    async fn get_stateful_set(&self, namespace: &str, name: &str) -> Result<StatefulSet, StoreError>;
    /// Create a StatefulSet in `namespace`.
    async fn create_stateful_set(
        &self,
        namespace: &str,
        stateful_set: &StatefulSet,
    ) -> Result<StatefulSet, StoreError>;
}

/// [`ObjectStore`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
}

impl std::fmt::Debug for KubeObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeObjectStore").finish_non_exhaustive()
    }
}

impl KubeObjectStore {
    /// Creates a store using the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeObjectStore {
    async fn get_janusgraph(&self, namespace: &str, name: &str) -> Result<Janusgraph, StoreError> {
        let api: Api<Janusgraph> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| StoreError::classify(&format!("Janusgraph {namespace}/{name}"), e))
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, StoreError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| StoreError::classify(&format!("Service {namespace}/{name}"), e))
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, StoreError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let name = service.metadata.name.as_deref().unwrap_or("<unnamed>");
        api.create(&Self::post_params(), service)
            .await
            .map_err(|e| StoreError::classify(&format!("Service {namespace}/{name}"), e))
    }

    async fn get_stateful_set(&self, namespace: &str, name: &str) -> Result<StatefulSet, StoreError> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| StoreError::classify(&format!("StatefulSet {namespace}/{name}"), e))
    }

    async fn create_stateful_set(
        &self,
        namespace: &str,
        stateful_set: &StatefulSet,
    ) -> Result<StatefulSet, StoreError> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        let name = stateful_set.metadata.name.as_deref().unwrap_or("<unnamed>");
        api.create(&Self::post_params(), stateful_set)
            .await
            .map_err(|e| StoreError::classify(&format!("StatefulSet {namespace}/{name}"), e))
    }
}
