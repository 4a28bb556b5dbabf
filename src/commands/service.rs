// ABOUTME: Service command implementation.
// ABOUTME: Lists the services of a cluster with their task counts.

use super::backend_connection::connect_to_backend;
use noderoll::config::Settings;
use noderoll::error::Result;
use noderoll::ops;
use noderoll::output::{Output, service_table};
use noderoll::types::ClusterName;

/// List services in a cluster.
pub async fn list(cluster: &str, settings: &Settings, output: Output) -> Result<()> {
    let cluster = ClusterName::new(cluster)?;
    let backend = connect_to_backend(settings, &output);

    let services = ops::list_services(&backend, &cluster).await?;
    output.result(&service_table(&services), &services);
    Ok(())
}
