// ABOUTME: Renew command implementation.
// ABOUTME: Runs the renewal state machine and reports each step as it starts.

use tokio_util::sync::CancellationToken;

use super::backend_connection::connect_to_backend;
use noderoll::config::Settings;
use noderoll::diagnostics::{Diagnostics, Warning};
use noderoll::error::Result;
use noderoll::output::Output;
use noderoll::renew::{RenewalStep, renew_nodes};
use noderoll::types::{ClusterName, GroupName};

/// Replace every node in `cluster` with new capacity from `group`.
pub async fn renew(
    cluster: &str,
    group: &str,
    settings: &Settings,
    cancel: &CancellationToken,
    mut output: Output,
) -> Result<()> {
    let cluster = ClusterName::new(cluster)?;
    let group = GroupName::new(group)?;

    output.start_timer();
    let backend = connect_to_backend(settings, &output);
    let mut diag = Diagnostics::default();

    output.progress(&format!("Renewing nodes of {cluster} via {group}"));
    let result = renew_nodes(
        &backend,
        &cluster,
        &group,
        settings.renewal_settings(),
        cancel,
        |step, plan| {
            match step {
                RenewalStep::ScaleOut => {
                    diag.extend(plan.concerns());
                    output.progress(&format!(
                        "  → Scaling {} out from {} to {}...",
                        plan.group.name, plan.original_desired, plan.scaled_desired
                    ));
                }
                RenewalStep::AwaitRegistration => {
                    output.progress("  → Waiting for replacement nodes to join...")
                }
                RenewalStep::Drain => {
                    output.progress(&format!("  → Draining {} node(s)...", plan.nodes.len()))
                }
                RenewalStep::AwaitDrain => output.progress("  → Waiting for tasks to move..."),
                RenewalStep::ScaleIn => output.progress(&format!(
                    "  → Scaling {} back in to {}...",
                    plan.group.name, plan.original_desired
                )),
                RenewalStep::Discover => {}
            }
        },
    )
    .await;

    if let Err(e) = &result {
        let step = e.step();
        if step.follows_mutation() {
            diag.warn(Warning::partial_renewal(format!(
                "stopped at {step} after remote state changed; check the desired capacity of {group} and the status of nodes in {cluster}"
            )));
        }
    }

    // Warnings are shown whether or not the renewal finished.
    for warning in diag.warnings() {
        output.warning(warning);
    }

    let report = result?;
    output.result("", &report);
    output.success(&format!(
        "Renewed {} node(s) in {}",
        report.replaced.len(),
        report.cluster
    ));
    Ok(())
}
