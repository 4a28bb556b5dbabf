// ABOUTME: Cluster operations trait for the cluster-management service.
// ABOUTME: List nodes and services, request node status changes.

use super::error::AccessError;
use super::shared_types::{Node, NodeStatus, ServiceSummary};
use crate::types::{ClusterName, NodeId};
use async_trait::async_trait;

/// Remote calls against a cluster.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// List every node registered to the cluster, fully described.
    ///
    /// Implementations must return a complete snapshot or fail; a cluster
    /// without nodes yields an empty list.
    async fn list_nodes(&self, cluster: &ClusterName) -> Result<Vec<Node>, AccessError>;

    /// Request a status change for a batch of nodes.
    async fn update_node_status(
        &self,
        cluster: &ClusterName,
        nodes: &[NodeId],
        status: &NodeStatus,
    ) -> Result<(), AccessError>;

    /// List every service in the cluster.
    async fn list_services(&self, cluster: &ClusterName)
    -> Result<Vec<ServiceSummary>, AccessError>;
}
