// ABOUTME: Named operations behind each CLI verb.
// ABOUTME: Thin compositions of registry, mutator and waiter calls over any backend.

use tokio_util::sync::CancellationToken;

use crate::backend::{ClusterOps, Node, NodeStatus, ServiceSummary};
use crate::fleet::{self, PollPolicy, PollReport, Result};
use crate::types::{ClusterName, NodeId};

pub use crate::renew::renew_nodes;

/// List every node in the cluster.
pub async fn list_nodes<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
) -> Result<Vec<Node>> {
    fleet::list_nodes(backend, cluster).await
}

/// List every service in the cluster.
pub async fn list_services<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
) -> Result<Vec<ServiceSummary>> {
    fleet::list_services(backend, cluster).await
}

/// Set the status of the given nodes to ACTIVE or DRAINING.
pub async fn update_node_status<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
    nodes: &[NodeId],
    status: &NodeStatus,
) -> Result<()> {
    fleet::set_status(backend, cluster, nodes, status).await
}

/// Mark nodes DRAINING and, when `wait` is given, block until they have drained.
///
/// Returns the wait's report, or `None` when not waiting.
///
/// # Errors
///
/// Validation errors are returned before any remote call. A timeout or
/// cancellation leaves the drain request in effect.
pub async fn drain_nodes<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
    nodes: &[NodeId],
    wait: Option<PollPolicy>,
    cancel: &CancellationToken,
) -> Result<Option<PollReport>> {
    fleet::set_status(backend, cluster, nodes, &NodeStatus::Draining).await?;

    match wait {
        Some(policy) => fleet::await_drained(backend, cluster, nodes, policy, cancel)
            .await
            .map(Some),
        None => Ok(None),
    }
}
