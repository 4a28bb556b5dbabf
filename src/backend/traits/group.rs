// ABOUTME: Capacity group operations trait.
// ABOUTME: Describe an autoscaling group and request a new desired capacity.

use super::error::AccessError;
use super::shared_types::Group;
use crate::types::GroupName;
use async_trait::async_trait;

/// Remote calls against an autoscaling capacity group.
#[async_trait]
pub trait GroupOps: Send + Sync {
    /// Fetch the group's current capacity settings and members.
    async fn describe_group(&self, group: &GroupName) -> Result<Group, AccessError>;

    /// Request a new desired capacity. Returns once the request is accepted.
    async fn set_desired_capacity(&self, group: &GroupName, desired: u32)
    -> Result<(), AccessError>;
}
