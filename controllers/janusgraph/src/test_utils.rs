//! Test utilities for unit testing the reconciler
//!
//! This module provides an in-memory `ObjectStore` and helpers for creating
//! test data.

#![cfg(test)]

use crate::store::{ObjectStore, StoreError};
use crds::{Janusgraph, JanusgraphSpec};
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::error::ErrorResponse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Key = (String, String);

/// Helper to create a test Janusgraph CR with a uid (required for owner references)
pub fn create_test_janusgraph(name: &str, namespace: &str, size: i32, version: &str) -> Janusgraph {
    Janusgraph {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{namespace}-{name}")),
            ..Default::default()
        },
        spec: JanusgraphSpec {
            size,
            version: version.to_string(),
        },
    }
}

/// Builds a `kube::Error::Api` with the given HTTP code and reason.
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {reason}"),
        reason: reason.to_string(),
        code,
    })
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn object_key(meta: &ObjectMeta, namespace: &str) -> Key {
    key(namespace, meta.name.as_deref().unwrap_or_default())
}

/// Mock ObjectStore for testing
///
/// Stores objects in memory, counts writes, and can be told to fail
/// specific calls with an injected API error.
#[derive(Clone, Default)]
pub struct MockObjectStore {
    janusgraphs: Arc<Mutex<HashMap<Key, Janusgraph>>>,
    services: Arc<Mutex<HashMap<Key, Service>>>,
    stateful_sets: Arc<Mutex<HashMap<Key, StatefulSet>>>,
    service_creates: Arc<Mutex<u32>>,
    stateful_set_creates: Arc<Mutex<u32>>,
    // (code, reason) to fail the next matching call with
    get_janusgraph_error: Arc<Mutex<Option<(u16, String)>>>,
    get_service_error: Arc<Mutex<Option<(u16, String)>>>,
    get_stateful_set_error: Arc<Mutex<Option<(u16, String)>>>,
    create_service_error: Arc<Mutex<Option<(u16, String)>>>,
    create_stateful_set_error: Arc<Mutex<Option<(u16, String)>>>,
}

impl MockObjectStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a Janusgraph CR (for test setup)
    pub fn put_janusgraph(&self, jg: Janusgraph) {
        let namespace = jg.metadata.namespace.clone().unwrap_or_default();
        let k = object_key(&jg.metadata, &namespace);
        self.janusgraphs.lock().unwrap().insert(k, jg);
    }

    /// Remove a Janusgraph CR (simulates deletion)
    pub fn remove_janusgraph(&self, namespace: &str, name: &str) {
        self.janusgraphs.lock().unwrap().remove(&key(namespace, name));
    }

    /// Add a Service directly, bypassing the write counter (for test setup)
    pub fn put_service(&self, namespace: &str, svc: Service) {
        let k = object_key(&svc.metadata, namespace);
        self.services.lock().unwrap().insert(k, svc);
    }

    /// Add a StatefulSet directly, bypassing the write counter (for test setup)
    pub fn put_stateful_set(&self, namespace: &str, sts: StatefulSet) {
        let k = object_key(&sts.metadata, namespace);
        self.stateful_sets.lock().unwrap().insert(k, sts);
    }

    pub fn service(&self, namespace: &str, name: &str) -> Option<Service> {
        self.services.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    pub fn stateful_set(&self, namespace: &str, name: &str) -> Option<StatefulSet> {
        self.stateful_sets.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    pub fn service_creates(&self) -> u32 {
        *self.service_creates.lock().unwrap()
    }

    pub fn stateful_set_creates(&self) -> u32 {
        *self.stateful_set_creates.lock().unwrap()
    }

    /// Total create calls issued against the store
    pub fn writes(&self) -> u32 {
        self.service_creates() + self.stateful_set_creates()
    }

    pub fn fail_get_janusgraph(&self, code: u16, reason: &str) {
        *self.get_janusgraph_error.lock().unwrap() = Some((code, reason.to_string()));
    }

    pub fn fail_get_service(&self, code: u16, reason: &str) {
        *self.get_service_error.lock().unwrap() = Some((code, reason.to_string()));
    }

    pub fn fail_get_stateful_set(&self, code: u16, reason: &str) {
        *self.get_stateful_set_error.lock().unwrap() = Some((code, reason.to_string()));
    }

    pub fn fail_create_service(&self, code: u16, reason: &str) {
        *self.create_service_error.lock().unwrap() = Some((code, reason.to_string()));
    }

    pub fn fail_create_stateful_set(&self, code: u16, reason: &str) {
        *self.create_stateful_set_error.lock().unwrap() = Some((code, reason.to_string()));
    }

    fn injected(slot: &Mutex<Option<(u16, String)>>, what: &str) -> Result<(), StoreError> {
        match slot.lock().unwrap().take() {
            Some((code, reason)) => Err(StoreError::classify(what, api_error(code, &reason))),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_janusgraph(&self, namespace: &str, name: &str) -> Result<Janusgraph, StoreError> {
        let what = format!("Janusgraph {namespace}/{name}");
        Self::injected(&self.get_janusgraph_error, &what)?;
        self.janusgraphs
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
            .ok_or(StoreError::NotFound(what))
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, StoreError> {
        let what = format!("Service {namespace}/{name}");
        Self::injected(&self.get_service_error, &what)?;
        self.service(namespace, name).ok_or(StoreError::NotFound(what))
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, StoreError> {
        *self.service_creates.lock().unwrap() += 1;
        let k = object_key(&service.metadata, namespace);
        let what = format!("Service {}/{}", k.0, k.1);
        Self::injected(&self.create_service_error, &what)?;
        let mut services = self.services.lock().unwrap();
        if services.contains_key(&k) {
            return Err(StoreError::AlreadyExists(what));
        }
        services.insert(k, service.clone());
        Ok(service.clone())
    }

    async fn get_stateful_set(&self, namespace: &str, name: &str) -> Result<StatefulSet, StoreError> {
        let what = format!("StatefulSet {namespace}/{name}");
        Self::injected(&self.get_stateful_set_error, &what)?;
        self.stateful_set(namespace, name).ok_or(StoreError::NotFound(what))
    }

    async fn create_stateful_set(
        &self,
        namespace: &str,
        stateful_set: &StatefulSet,
    ) -> Result<StatefulSet, StoreError> {
        *self.stateful_set_creates.lock().unwrap() += 1;
        let k = object_key(&stateful_set.metadata, namespace);
        let what = format!("StatefulSet {}/{}", k.0, k.1);
        Self::injected(&self.create_stateful_set_error, &what)?;
        let mut stateful_sets = self.stateful_sets.lock().unwrap();
        if stateful_sets.contains_key(&k) {
            return Err(StoreError::AlreadyExists(what));
        }
        stateful_sets.insert(k, stateful_set.clone());
        Ok(stateful_set.clone())
    }
}
