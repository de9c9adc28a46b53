//! Controller-specific error types.
//!
//! This module defines error types specific to the Janusgraph Controller
//! that are not covered by upstream library errors.

use crate::store::StoreError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the Janusgraph Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Object store read/write error
    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    /// Kubernetes client error (client construction, watch setup)
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Object is missing a required metadata field
    #[error("Object is missing {0}")]
    MissingObjectKey(&'static str),

    /// Owner reference could not be recorded on a child object
    #[error("Failed to set owner reference: {0}")]
    Ownership(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
