// ABOUTME: Diagnostics accumulator for non-fatal warnings during a command.
// ABOUTME: Collects conditions that shouldn't fail a renewal but should be shown to operators.

use serde::Serialize;

/// Collects non-fatal warnings during node operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Record several warnings at once.
    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a command.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The group may terminate replacement nodes on scale-in.
    pub fn termination_policy(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TerminationPolicy,
            message: message.into(),
        }
    }

    /// A node's agent is disconnected, so its tasks may not move.
    pub fn agent_disconnected(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::AgentDisconnected,
            message: message.into(),
        }
    }

    /// A node being replaced does not belong to the group, so scale-in won't retire it.
    pub fn outside_group(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::OutsideGroup,
            message: message.into(),
        }
    }

    /// A renewal stopped after it had already changed remote state.
    pub fn partial_renewal(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PartialRenewal,
            message: message.into(),
        }
    }

    /// A requested node id was not found in the cluster.
    pub fn unknown_node(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::UnknownNode,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during node operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Group termination policy does not prefer the oldest instances.
    TerminationPolicy,
    /// Container agent on a node being drained is disconnected.
    AgentDisconnected,
    /// Node being replaced runs on a machine outside the group.
    OutsideGroup,
    /// Renewal failed after capacity or node status had been changed.
    PartialRenewal,
    /// Node id given by the operator is not in the cluster listing.
    UnknownNode,
}
