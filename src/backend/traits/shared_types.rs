// ABOUTME: Shared types used across capability trait definitions.
// ABOUTME: Node, NodeStatus, Group and ServiceSummary as reported by the remote service.

use crate::types::{GroupName, InstanceId, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a container instance.
///
/// Only `Active` and `Draining` can be requested by callers; the remaining
/// values are reported by the remote service. Unknown values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeStatus {
    Active,
    Draining,
    Inactive,
    Registering,
    Deregistering,
    RegistrationFailed,
    Other(String),
}

impl NodeStatus {
    /// Parse a status as reported by the remote service (case-insensitive).
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => NodeStatus::Active,
            "DRAINING" => NodeStatus::Draining,
            "INACTIVE" => NodeStatus::Inactive,
            "REGISTERING" => NodeStatus::Registering,
            "DEREGISTERING" => NodeStatus::Deregistering,
            "REGISTRATION_FAILED" => NodeStatus::RegistrationFailed,
            _ => NodeStatus::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeStatus::Active => "ACTIVE",
            NodeStatus::Draining => "DRAINING",
            NodeStatus::Inactive => "INACTIVE",
            NodeStatus::Registering => "REGISTERING",
            NodeStatus::Deregistering => "DEREGISTERING",
            NodeStatus::RegistrationFailed => "REGISTRATION_FAILED",
            NodeStatus::Other(s) => s,
        }
    }

    /// Whether a caller may request this status.
    pub fn is_requestable(&self) -> bool {
        matches!(self, NodeStatus::Active | NodeStatus::Draining)
    }

    /// Whether a node in this status has stopped accepting new tasks.
    pub fn is_draining_or_gone(&self) -> bool {
        matches!(
            self,
            NodeStatus::Draining | NodeStatus::Inactive | NodeStatus::Deregistering
        )
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NodeStatus {
    fn from(value: String) -> Self {
        NodeStatus::parse(&value)
    }
}

impl From<NodeStatus> for String {
    fn from(value: NodeStatus) -> Self {
        value.as_str().to_string()
    }
}

/// A container instance registered to a cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Container instance id as reported by the service (usually a full resource name).
    pub id: NodeId,
    /// Machine backing this node, if known.
    pub instance_id: Option<InstanceId>,
    /// Current status.
    pub status: NodeStatus,
    /// Tasks currently running on the node.
    pub running_tasks: u32,
    /// Tasks placed but not yet running.
    pub pending_tasks: u32,
    /// Whether the node's agent is connected.
    pub agent_connected: bool,
    /// When the node joined the cluster.
    pub registered_at: Option<DateTime<Utc>>,
}

impl Node {
    /// Whether `ident` names this node: full resource name, short id, or backing instance id.
    pub fn matches(&self, ident: &str) -> bool {
        self.id.as_str() == ident
            || self.id.short() == ident
            || self
                .instance_id
                .as_ref()
                .is_some_and(|i| i.as_str() == ident)
    }

    /// Drained: no running tasks and no longer accepting work.
    pub fn is_drained(&self) -> bool {
        self.running_tasks == 0 && self.status.is_draining_or_gone()
    }
}

/// An autoscaling capacity group backing a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: GroupName,
    pub desired: u32,
    pub min: u32,
    pub max: u32,
    /// Machines currently in the group.
    pub instances: Vec<InstanceId>,
    /// Termination policies in evaluation order.
    pub termination_policies: Vec<String>,
}

impl Group {
    /// Whether scale-in removes the oldest machines first.
    ///
    /// Renewal relies on this: the replaced nodes must be the ones terminated
    /// when capacity goes back down.
    pub fn prefers_oldest(&self) -> bool {
        self.termination_policies.first().is_some_and(|p| {
            matches!(
                p.as_str(),
                "OldestInstance" | "OldestLaunchConfiguration" | "OldestLaunchTemplate"
            )
        })
    }

    /// Whether `instance` is one of the group's machines.
    pub fn contains(&self, instance: &InstanceId) -> bool {
        self.instances.contains(instance)
    }

    /// Whether `desired` lies within the group's bounds.
    pub fn admits(&self, desired: u32) -> bool {
        (self.min..=self.max).contains(&desired)
    }
}

/// Summary information about a service running in a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub status: String,
    pub desired: u32,
    pub running: u32,
    pub pending: u32,
    pub task_definition: String,
    pub launch_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(status: NodeStatus, running: u32) -> Node {
        Node {
            id: NodeId::new("arn:aws:ecs:us-east-1:1:container-instance/demo/abc"),
            instance_id: Some(InstanceId::new("i-1")),
            status,
            running_tasks: running,
            pending_tasks: 0,
            agent_connected: true,
            registered_at: None,
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(NodeStatus::parse("draining"), NodeStatus::Draining);
        assert_eq!(NodeStatus::parse(" ACTIVE "), NodeStatus::Active);
        assert_eq!(
            NodeStatus::parse("STOPPED"),
            NodeStatus::Other("STOPPED".to_string())
        );
    }

    #[test]
    fn only_active_and_draining_are_requestable() {
        assert!(NodeStatus::Active.is_requestable());
        assert!(NodeStatus::Draining.is_requestable());
        assert!(!NodeStatus::Inactive.is_requestable());
        assert!(!NodeStatus::parse("bogus").is_requestable());
    }

    #[test]
    fn node_matches_any_identifier_form() {
        let n = node(NodeStatus::Active, 0);
        assert!(n.matches("arn:aws:ecs:us-east-1:1:container-instance/demo/abc"));
        assert!(n.matches("abc"));
        assert!(n.matches("i-1"));
        assert!(!n.matches("i-2"));
    }

    #[test]
    fn drained_requires_zero_tasks_and_draining_status() {
        assert!(node(NodeStatus::Draining, 0).is_drained());
        assert!(node(NodeStatus::Inactive, 0).is_drained());
        assert!(!node(NodeStatus::Draining, 2).is_drained());
        assert!(!node(NodeStatus::Active, 0).is_drained());
    }

    #[test]
    fn group_bounds_and_termination_policy() {
        let group = Group {
            name: GroupName::new("asg-demo").unwrap(),
            desired: 3,
            min: 1,
            max: 6,
            instances: vec![],
            termination_policies: vec!["OldestInstance".to_string(), "Default".to_string()],
        };
        assert!(group.admits(6));
        assert!(!group.admits(7));
        assert!(!group.admits(0));
        assert!(group.prefers_oldest());
    }
}
