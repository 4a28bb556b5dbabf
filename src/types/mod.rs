// ABOUTME: Type-safe identifiers and validated domain names.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod cluster_name;
mod id;

pub use cluster_name::{ClusterName, GroupName, NameError};
pub use id::{InstanceId, NodeId};
