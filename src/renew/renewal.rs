// ABOUTME: Generic renewal struct parameterized by state marker, plus its plan and settings.
// ABOUTME: The plan is request-scoped: built at discovery, dropped when the renewal ends.

use std::time::Duration;

use nonempty::NonEmpty;
use serde::Serialize;

use crate::backend::{Group, Node};
use crate::diagnostics::Warning;
use crate::fleet::{PollPolicy, PollReport, ValidationError};
use crate::types::{ClusterName, GroupName, NodeId};

/// Timing and behaviour knobs for one renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalSettings {
    /// Interval between registry polls.
    pub poll_interval: Duration,
    /// How long to wait for the old nodes to drain.
    pub drain_timeout: Duration,
    /// Wait for replacement nodes to join before draining.
    pub await_registration: bool,
    /// How long to wait for replacement nodes to join.
    pub registration_timeout: Duration,
}

impl Default for RenewalSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            drain_timeout: Duration::from_secs(600),
            await_registration: true,
            registration_timeout: Duration::from_secs(600),
        }
    }
}

impl RenewalSettings {
    pub fn drain_policy(&self) -> Result<PollPolicy, ValidationError> {
        PollPolicy::new(self.poll_interval, self.drain_timeout)
    }

    pub fn registration_policy(&self) -> Result<PollPolicy, ValidationError> {
        PollPolicy::new(self.poll_interval, self.registration_timeout)
    }
}

/// Which nodes are replaced and how the group's capacity moves.
#[derive(Debug, Clone)]
pub struct RenewalPlan {
    pub cluster: ClusterName,
    /// Group as described at discovery.
    pub group: Group,
    /// Nodes to replace, in listing order.
    pub nodes: NonEmpty<Node>,
    /// Desired capacity before the renewal; restored at scale-in.
    pub original_desired: u32,
    /// Desired capacity while old and new nodes coexist.
    pub scaled_desired: u32,
}

impl RenewalPlan {
    pub(crate) fn new(cluster: ClusterName, group: Group, nodes: NonEmpty<Node>) -> Self {
        let original_desired = group.desired;
        let scaled_desired = original_desired.saturating_add(nodes.len() as u32);
        Self {
            cluster,
            group,
            nodes,
            original_desired,
            scaled_desired,
        }
    }

    /// Ids of the nodes being replaced.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Whether `node` is one of the nodes being replaced.
    pub fn includes(&self, node: &Node) -> bool {
        self.nodes.iter().any(|n| n.id == node.id)
    }

    /// Conditions that do not block the renewal but deserve the operator's attention.
    pub fn concerns(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if !self.group.prefers_oldest() {
            warnings.push(Warning::termination_policy(format!(
                "group {} does not terminate oldest instances first ({}); scale-in may remove replacement nodes",
                self.group.name,
                if self.group.termination_policies.is_empty() {
                    "no policy".to_string()
                } else {
                    self.group.termination_policies.join(", ")
                }
            )));
        }

        for node in self.nodes.iter().filter(|n| !n.agent_connected) {
            warnings.push(Warning::agent_disconnected(format!(
                "node {} has a disconnected agent; its tasks may not relocate",
                node.id.short()
            )));
        }

        for node in self.nodes.iter() {
            let Some(instance) = &node.instance_id else {
                continue;
            };
            if !self.group.contains(instance) {
                warnings.push(Warning::outside_group(format!(
                    "node {} runs on {instance}, which is not in group {}; scale-in will not retire it",
                    node.id.short(),
                    self.group.name
                )));
            }
        }

        warnings
    }
}

/// A renewal in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Renewal<S> {
    pub(crate) plan: RenewalPlan,
    pub(crate) settings: RenewalSettings,
    pub(crate) registration: Option<PollReport>,
    pub(crate) drain: Option<PollReport>,
    pub(crate) state: S,
}

impl<S> Renewal<S> {
    pub fn plan(&self) -> &RenewalPlan {
        &self.plan
    }
}

/// Summary of a completed renewal.
#[derive(Debug, Clone, Serialize)]
pub struct RenewalReport {
    pub cluster: ClusterName,
    pub group: GroupName,
    pub replaced: Vec<NodeId>,
    pub scaled_to: u32,
    pub restored_to: u32,
    /// Polls spent waiting for replacements to join (`None` when skipped).
    pub registration_polls: Option<u32>,
    pub drain_polls: u32,
}
