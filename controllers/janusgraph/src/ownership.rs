//! Owner references from child objects back to their Janusgraph CR.
//!
//! Kubernetes garbage collection removes the Service and StatefulSet once
//! the owning CR is deleted, which is the only cleanup this controller has.

use crate::error::ControllerError;
use crds::Janusgraph;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;

/// Records `owner` as the controller of the object described by `child`.
///
/// Fails when the CR has no name or uid yet (an owner reference needs both)
/// or when `child` is already controlled by a different object. Callers must
/// not create the child if this fails, otherwise it would never be
/// garbage collected.
pub fn set_controller_owner(child: &mut ObjectMeta, owner: &Janusgraph) -> Result<(), ControllerError> {
    let mut owner_ref = owner.controller_owner_ref(&()).ok_or_else(|| {
        ControllerError::Ownership(format!(
            "Janusgraph {} has no name or uid",
            owner.metadata.name.as_deref().unwrap_or("<unknown>")
        ))
    })?;
    // The owner cannot be removed in foreground deletion before its children
    owner_ref.block_owner_deletion = Some(true);

    let refs = child.owner_references.get_or_insert_with(Vec::new);

    if let Some(existing) = refs.iter().find(|r| r.controller == Some(true)) {
        if existing.uid == owner_ref.uid {
            return Ok(());
        }
        return Err(ControllerError::Ownership(format!(
            "{} is already controlled by {} {}",
            child.name.as_deref().unwrap_or("<unnamed>"),
            existing.kind,
            existing.name
        )));
    }

    refs.push(owner_ref);
    Ok(())
}
