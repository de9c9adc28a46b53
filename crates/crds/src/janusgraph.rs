//! Janusgraph CRD
//!
//! Declares a JanusGraph deployment: how many replicas to run and which
//! `janusgraph/janusgraph` image tag to run them from.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "graph.ibm.com",
    version = "v1alpha1",
    kind = "Janusgraph",
    plural = "janusgraphs",
    namespaced,
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".spec.size"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct JanusgraphSpec {
    /// Number of JanusGraph replicas
    #[schemars(range(min = 0))]
    pub size: i32,

    /// JanusGraph image tag (e.g. "0.6.0")
    pub version: String,
}
