// ABOUTME: Access to the remote cluster-management service.
// ABOUTME: Capability traits plus the aws-client implementation used by the binary.

mod aws_cli;
pub mod traits;

pub use aws_cli::{AwsCliBackend, AwsCliConfig};
pub use traits::{
    AccessError, ClusterBackend, ClusterOps, Group, GroupOps, Node, NodeStatus, ServiceSummary,
};
