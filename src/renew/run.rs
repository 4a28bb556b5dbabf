// ABOUTME: Drives a renewal from discovery to completion.
// ABOUTME: Stops at the first failing step; nothing already requested is reverted.

use tokio_util::sync::CancellationToken;

use crate::backend::ClusterBackend;
use crate::types::{ClusterName, GroupName};

use super::error::{RenewalError, RenewalStep};
use super::renewal::{Renewal, RenewalPlan, RenewalReport, RenewalSettings};
use super::state::Discovered;

/// Replace every node of `cluster` with fresh capacity from `group`.
///
/// Runs discover, scale-out, the optional registration wait, drain, the drain
/// wait and scale-in, strictly in that order. `on_step` is called with the
/// plan before each step after discovery, so callers can report progress.
///
/// # Errors
///
/// Returns `RenewalError::EmptyCluster` when there is nothing to renew (no
/// mutation is made), otherwise a `RenewalError::Step` naming the step that
/// failed. Steps before it are not undone.
pub async fn renew_nodes<B, F>(
    backend: &B,
    cluster: &ClusterName,
    group: &GroupName,
    settings: RenewalSettings,
    cancel: &CancellationToken,
    mut on_step: F,
) -> Result<RenewalReport, RenewalError>
where
    B: ClusterBackend + ?Sized,
    F: FnMut(RenewalStep, &RenewalPlan),
{
    let renewal = Renewal::<Discovered>::discover(backend, cluster, group, settings).await?;

    on_step(RenewalStep::ScaleOut, renewal.plan());
    let renewal = renewal.scale_out(backend).await?;

    on_step(RenewalStep::AwaitRegistration, renewal.plan());
    let renewal = renewal.await_registration(backend, cancel).await?;

    on_step(RenewalStep::Drain, renewal.plan());
    let renewal = renewal.drain(backend).await?;

    on_step(RenewalStep::AwaitDrain, renewal.plan());
    let renewal = renewal.await_drain(backend, cancel).await?;

    on_step(RenewalStep::ScaleIn, renewal.plan());
    let renewal = renewal.scale_in(backend).await?;

    let report = renewal.finish();
    tracing::info!(
        "renewed {} node(s) in {}; group {} restored to {}",
        report.replaced.len(),
        report.cluster,
        report.group,
        report.restored_to
    );
    Ok(report)
}
