// ABOUTME: Drain waiter: polls the registry until targeted nodes are drained.
// ABOUTME: Bounded by a deadline and interruptible through a cancellation token.

use tokio_util::sync::CancellationToken;

use crate::backend::ClusterOps;
use crate::types::{ClusterName, NodeId};

use super::error::{Result, ValidationError};
use super::poll::{PollPolicy, PollReport, poll_until};
use super::registry;

/// Wait until every node in `nodes` is drained.
///
/// A node counts as drained when it is absent from the listing, or reports zero
/// running tasks while DRAINING (or already INACTIVE/DEREGISTERING).
///
/// # Errors
///
/// - `ValidationError::EmptyNodeList` if `nodes` is empty
/// - `FleetError::Timeout` once `policy.deadline` has elapsed
/// - `FleetError::Cancelled` as soon as `cancel` fires
/// - `FleetError::Access` if a registry query fails
pub async fn await_drained<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
    nodes: &[NodeId],
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<PollReport> {
    if nodes.is_empty() {
        return Err(ValidationError::EmptyNodeList.into());
    }

    let waiting_for = format!("{} node(s) in {} to drain", nodes.len(), cluster);
    let report = poll_until(policy, cancel, &waiting_for, move || async move {
        let snapshot = registry::list_nodes(backend, cluster).await?;
        let pending = registry::undrained(&snapshot, nodes);
        if !pending.is_empty() {
            tracing::debug!(
                "{} of {} node(s) still draining: {}",
                pending.len(),
                nodes.len(),
                pending
                    .iter()
                    .map(|id| id.short())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(pending.is_empty())
    })
    .await?;

    tracing::info!(
        "{} node(s) drained after {} poll(s)",
        nodes.len(),
        report.polls
    );
    Ok(report)
}
