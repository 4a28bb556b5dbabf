// ABOUTME: Composable capability traits for the cluster-management service.
// ABOUTME: Defines ClusterOps, GroupOps and the combined ClusterBackend.

mod cluster;
mod error;
mod group;
mod shared_types;

pub use cluster::ClusterOps;
pub use error::AccessError;
pub use group::GroupOps;
pub use shared_types::*;

/// Everything a renewal needs from the remote service.
///
/// Auto-implemented for any type providing both capabilities.
pub trait ClusterBackend: ClusterOps + GroupOps {}

impl<T: ClusterOps + GroupOps> ClusterBackend for T {}
