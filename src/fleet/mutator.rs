// ABOUTME: Validated status and capacity change requests.
// ABOUTME: Requests are fire-and-forget; callers confirm the effect by polling.

use crate::backend::{ClusterOps, Group, GroupOps, NodeStatus};
use crate::types::{ClusterName, NodeId};

use super::error::{Result, ValidationError};

/// Check a status request without touching the remote service.
pub fn validate_status_request(
    nodes: &[NodeId],
    status: &NodeStatus,
) -> std::result::Result<(), ValidationError> {
    if nodes.is_empty() {
        return Err(ValidationError::EmptyNodeList);
    }
    if !status.is_requestable() {
        return Err(ValidationError::InvalidStatus(status.to_string()));
    }
    Ok(())
}

/// Check a capacity request against the group's bounds.
pub fn validate_capacity(group: &Group, desired: u32) -> std::result::Result<(), ValidationError> {
    if group.admits(desired) {
        Ok(())
    } else {
        Err(ValidationError::CapacityOutOfRange {
            group: group.name.to_string(),
            desired,
            min: group.min,
            max: group.max,
        })
    }
}

/// Request a status change for a batch of nodes.
///
/// # Errors
///
/// Returns `ValidationError` for an empty batch or a status other than ACTIVE
/// or DRAINING (no remote call is made), or `AccessError` if the request fails.
pub async fn set_status<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
    nodes: &[NodeId],
    status: &NodeStatus,
) -> Result<()> {
    validate_status_request(nodes, status)?;

    tracing::info!(
        "requesting {} for {} node(s) in {}",
        status,
        nodes.len(),
        cluster
    );
    backend.update_node_status(cluster, nodes, status).await?;
    Ok(())
}

/// Request a new desired capacity for a group.
///
/// # Errors
///
/// Returns `ValidationError` if `desired` is outside `[group.min, group.max]`.
pub async fn set_group_capacity<G: GroupOps + ?Sized>(
    backend: &G,
    group: &Group,
    desired: u32,
) -> Result<()> {
    validate_capacity(group, desired)?;

    tracing::info!(
        "requesting desired capacity {} -> {} for group {}",
        group.desired,
        desired,
        group.name
    );
    backend.set_desired_capacity(&group.name, desired).await?;
    Ok(())
}
