//! Desired-state builders for the objects a Janusgraph CR owns.
//!
//! Every function here is pure: the same declaration always yields the same
//! Service and StatefulSet. The label set produced by [`labels_for`] is the
//! only link between the Service, the StatefulSet and its pods, so every
//! selector and the pod template must use it unchanged.

use crate::error::ControllerError;
use crds::Janusgraph;
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSecurityContext, PodSpec, PodTemplateSpec, Service, ServicePort,
    ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

/// Port JanusGraph's Gremlin server listens on.
pub const JANUSGRAPH_PORT: i32 = 8182;

/// Name used for the container, its port and the Service port.
pub const JANUSGRAPH_PORT_NAME: &str = "janusgraph";

/// Image repository; the tag comes from `spec.version`.
pub const JANUSGRAPH_IMAGE: &str = "janusgraph/janusgraph";

/// Supplemental group granted to JanusGraph pods.
pub const JANUSGRAPH_SUPPLEMENTAL_GROUP: i64 = 999;

/// Service account JanusGraph pods run under.
pub const JANUSGRAPH_SERVICE_ACCOUNT: &str = "janus-custom-sa";

const SERVICE_SUFFIX: &str = "-service";
const LABEL_APP: &str = "app";
const LABEL_APP_VALUE: &str = "Janusgraph";
const LABEL_CR: &str = "janusgraph_cr";

/// Label set shared by the Service selector, the StatefulSet selector and the pod template.
pub fn labels_for(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_APP.to_string(), LABEL_APP_VALUE.to_string()),
        (LABEL_CR.to_string(), name.to_string()),
    ])
}

/// Name of the governing Service for a Janusgraph CR.
pub fn service_name(name: &str) -> String {
    format!("{name}{SERVICE_SUFFIX}")
}

/// Name of the StatefulSet for a Janusgraph CR (same as the CR).
pub fn stateful_set_name(name: &str) -> String {
    name.to_string()
}

/// Container image for a JanusGraph version tag.
pub fn image_for(version: &str) -> String {
    format!("{JANUSGRAPH_IMAGE}:{version}")
}

fn declaration_name(janusgraph: &Janusgraph) -> Result<&str, ControllerError> {
    janusgraph
        .metadata
        .name
        .as_deref()
        .ok_or(ControllerError::MissingObjectKey(".metadata.name"))
}

/// Builds the Service fronting the JanusGraph pods.
///
/// The owner reference is not set here; see [`crate::ownership`].
pub fn build_service(janusgraph: &Janusgraph) -> Result<Service, ControllerError> {
    let name = declaration_name(janusgraph)?;
    let labels = labels_for(name);

    Ok(Service {
        metadata: ObjectMeta {
            name: Some(service_name(name)),
            namespace: janusgraph.metadata.namespace.clone(),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(JANUSGRAPH_PORT_NAME.to_string()),
                port: JANUSGRAPH_PORT,
                ..Default::default()
            }]),
            selector: Some(labels),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Builds the StatefulSet running JanusGraph.
///
/// Replica count and image tag are copied from the declaration as it is
/// right now; later edits to the CR are not propagated.
pub fn build_stateful_set(janusgraph: &Janusgraph) -> Result<StatefulSet, ControllerError> {
    let name = declaration_name(janusgraph)?;
    let labels = labels_for(name);

    let container = Container {
        name: JANUSGRAPH_PORT_NAME.to_string(),
        image: Some(image_for(&janusgraph.spec.version)),
        ports: Some(vec![ContainerPort {
            container_port: JANUSGRAPH_PORT,
            name: Some(JANUSGRAPH_PORT_NAME.to_string()),
            ..Default::default()
        }]),
        env: Some(Vec::new()),
        ..Default::default()
    };

    let template = PodTemplateSpec {
        metadata: Some(ObjectMeta {
            name: Some(JANUSGRAPH_PORT_NAME.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            security_context: Some(PodSecurityContext {
                supplemental_groups: Some(vec![JANUSGRAPH_SUPPLEMENTAL_GROUP]),
                ..Default::default()
            }),
            service_account_name: Some(JANUSGRAPH_SERVICE_ACCOUNT.to_string()),
            containers: vec![container],
            restart_policy: Some("Always".to_string()),
            ..Default::default()
        }),
    };

    Ok(StatefulSet {
        metadata: ObjectMeta {
            name: Some(stateful_set_name(name)),
            namespace: janusgraph.metadata.namespace.clone(),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            replicas: Some(janusgraph.spec.size),
            selector: LabelSelector {
                match_labels: Some(labels),
                ..Default::default()
            },
            // Optional from k8s 1.31 onwards; `into` covers both shapes.
            service_name: service_name(name).into(),
            template,
            ..Default::default()
        }),
        ..Default::default()
    })
}
