// ABOUTME: Read-only queries against a cluster's nodes and services.
// ABOUTME: Every call returns a fresh snapshot; nothing is cached between calls.

use crate::backend::{ClusterOps, Node, ServiceSummary};
use crate::types::{ClusterName, NodeId};

use super::error::Result;

/// List every node in the cluster. An empty cluster yields an empty list.
pub async fn list_nodes<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
) -> Result<Vec<Node>> {
    let nodes = backend.list_nodes(cluster).await?;
    tracing::debug!("cluster {} has {} node(s)", cluster, nodes.len());
    Ok(nodes)
}

/// List every service in the cluster.
pub async fn list_services<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
) -> Result<Vec<ServiceSummary>> {
    let services = backend.list_services(cluster).await?;
    tracing::debug!("cluster {} has {} service(s)", cluster, services.len());
    Ok(services)
}

/// Targets from `ids` that are still present and not yet drained in `nodes`.
///
/// A target missing from the snapshot has left the cluster and counts as drained.
pub fn undrained<'a>(nodes: &[Node], ids: &'a [NodeId]) -> Vec<&'a NodeId> {
    ids.iter()
        .filter(|id| {
            nodes
                .iter()
                .find(|n| n.matches(id.as_str()))
                .is_some_and(|n| !n.is_drained())
        })
        .collect()
}
