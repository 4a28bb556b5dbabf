// ABOUTME: Node command implementations: list, status update and drain.
// ABOUTME: Parses operator input into validated types before any remote call.

use tokio_util::sync::CancellationToken;

use super::backend_connection::connect_to_backend;
use noderoll::backend::{ClusterOps, NodeStatus};
use noderoll::config::Settings;
use noderoll::diagnostics::{Diagnostics, Warning};
use noderoll::error::Result;
use noderoll::fleet::validate_status_request;
use noderoll::ops;
use noderoll::output::{Output, node_table};
use noderoll::types::{ClusterName, NodeId};

/// List nodes in a cluster.
pub async fn list(cluster: &str, settings: &Settings, output: Output) -> Result<()> {
    let cluster = ClusterName::new(cluster)?;
    let backend = connect_to_backend(settings, &output);

    let nodes = ops::list_nodes(&backend, &cluster).await?;
    output.result(&node_table(&nodes), &nodes);
    Ok(())
}

/// Set the status of nodes.
pub async fn update(
    cluster: &str,
    ids: &[String],
    status: &str,
    settings: &Settings,
    mut output: Output,
) -> Result<()> {
    let cluster = ClusterName::new(cluster)?;
    let ids = parse_ids(ids);
    let status = NodeStatus::parse(status);
    validate_status_request(&ids, &status)?;

    output.start_timer();
    let backend = connect_to_backend(settings, &output);
    let mut diag = Diagnostics::default();
    warn_unknown(&backend, &cluster, &ids, &mut diag).await;

    output.progress(&format!(
        "Setting {} node(s) in {} to {}",
        ids.len(),
        cluster,
        status
    ));
    ops::update_node_status(&backend, &cluster, &ids, &status).await?;

    for warning in diag.warnings() {
        output.warning(warning);
    }
    output.success(&format!("Requested {status} for {} node(s)", ids.len()));
    Ok(())
}

/// Drain nodes, optionally waiting for completion.
pub async fn drain(
    cluster: &str,
    ids: &[String],
    wait: bool,
    settings: &Settings,
    cancel: &CancellationToken,
    mut output: Output,
) -> Result<()> {
    let cluster = ClusterName::new(cluster)?;
    let ids = parse_ids(ids);
    validate_status_request(&ids, &NodeStatus::Draining)?;
    let policy = if wait {
        Some(settings.drain_policy()?)
    } else {
        None
    };

    output.start_timer();
    let backend = connect_to_backend(settings, &output);
    let mut diag = Diagnostics::default();
    warn_unknown(&backend, &cluster, &ids, &mut diag).await;

    output.progress(&format!("Draining {} node(s) in {}", ids.len(), cluster));
    if wait {
        output.progress(&format!(
            "  → Waiting up to {}s for tasks to move...",
            settings.drain_timeout.as_secs()
        ));
    }
    let report = ops::drain_nodes(&backend, &cluster, &ids, policy, cancel).await?;

    for warning in diag.warnings() {
        output.warning(warning);
    }
    match report {
        Some(report) => output.success(&format!(
            "Drained {} node(s) after {} poll(s)",
            ids.len(),
            report.polls
        )),
        None => output.success(&format!("Requested drain for {} node(s)", ids.len())),
    }
    Ok(())
}

/// Split comma- or space-separated id arguments and drop blanks.
fn parse_ids(raw: &[String]) -> Vec<NodeId> {
    raw.iter()
        .flat_map(|s| s.split([',', ' ']))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(NodeId::from)
        .collect()
}

/// Record a warning for ids that do not appear in the cluster. A failed
/// listing is only logged; the request itself reports access problems.
async fn warn_unknown<C: ClusterOps + ?Sized>(
    backend: &C,
    cluster: &ClusterName,
    ids: &[NodeId],
    diag: &mut Diagnostics,
) {
    let nodes = match ops::list_nodes(backend, cluster).await {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::debug!("skipping node id check: {e}");
            return;
        }
    };
    for id in ids {
        if !nodes.iter().any(|n| n.matches(id.as_str())) {
            diag.warn(Warning::unknown_node(format!(
                "node {id} is not registered in {cluster}"
            )));
        }
    }
}
