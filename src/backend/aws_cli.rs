// ABOUTME: Backend implementation that drives the `aws` command-line client.
// ABOUTME: Maps capability calls onto ecs/autoscaling subcommands and parses their JSON output.

use crate::backend::traits::{
    AccessError, ClusterOps, Group, GroupOps, Node, NodeStatus, ServiceSummary,
};
use crate::types::{ClusterName, GroupName, InstanceId, NodeId};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Remote API limit for describe-container-instances.
const DESCRIBE_NODES_BATCH: usize = 100;
/// Remote API limit for update-container-instances-state.
const UPDATE_NODES_BATCH: usize = 10;
/// Remote API limit for describe-services.
const DESCRIBE_SERVICES_BATCH: usize = 10;

/// How to invoke the `aws` client.
#[derive(Debug, Clone)]
pub struct AwsCliConfig {
    /// Program to execute.
    pub program: String,
    /// Named profile (`--profile`).
    pub profile: Option<String>,
    /// Region override (`--region`).
    pub region: Option<String>,
    /// Upper bound for a single invocation.
    pub timeout: Duration,
}

impl Default for AwsCliConfig {
    fn default() -> Self {
        Self {
            program: "aws".to_string(),
            profile: None,
            region: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Cluster backend backed by the `aws` command-line client.
///
/// Credentials, retries and request signing are the client's business; this
/// type only builds arguments and interprets output.
#[derive(Debug, Clone)]
pub struct AwsCliBackend {
    config: AwsCliConfig,
}

impl AwsCliBackend {
    pub fn new(config: AwsCliConfig) -> Self {
        Self { config }
    }

    /// Build the full argument list for one invocation.
    fn args(&self, service: &str, operation: &str, extra: &[String]) -> Vec<String> {
        let mut args = vec![service.to_string(), operation.to_string()];
        args.extend(extra.iter().cloned());
        args.push("--output".to_string());
        args.push("json".to_string());
        if let Some(profile) = &self.config.profile {
            args.push("--profile".to_string());
            args.push(profile.clone());
        }
        if let Some(region) = &self.config.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        args
    }

    /// Run one invocation and return its stdout.
    async fn invoke(
        &self,
        service: &str,
        operation: &str,
        extra: &[String],
    ) -> Result<String, AccessError> {
        let args = self.args(service, operation, extra);
        tracing::debug!("{} {}", self.config.program, args.join(" "));

        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.config.timeout, child)
            .await
            .map_err(|_| AccessError::Timeout(self.config.timeout))?
            .map_err(|e| AccessError::Spawn(format!("{}: {}", self.config.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run one invocation and parse its JSON output.
    async fn invoke_json<T: DeserializeOwned>(
        &self,
        service: &str,
        operation: &str,
        extra: &[String],
    ) -> Result<T, AccessError> {
        let stdout = self.invoke(service, operation, extra).await?;
        serde_json::from_str(&stdout)
            .map_err(|e| AccessError::Malformed(format!("{service} {operation}: {e}")))
    }

    async fn describe_nodes(
        &self,
        cluster: &ClusterName,
        arns: &[String],
    ) -> Result<Vec<Node>, AccessError> {
        let mut extra = vec![
            "--cluster".to_string(),
            cluster.to_string(),
            "--container-instances".to_string(),
        ];
        extra.extend(arns.iter().cloned());

        let response: DescribeContainerInstances = self
            .invoke_json("ecs", "describe-container-instances", &extra)
            .await?;
        response.into_nodes()
    }

    async fn describe_services(
        &self,
        cluster: &ClusterName,
        arns: &[String],
    ) -> Result<Vec<ServiceSummary>, AccessError> {
        let mut extra = vec![
            "--cluster".to_string(),
            cluster.to_string(),
            "--services".to_string(),
        ];
        extra.extend(arns.iter().cloned());

        let response: DescribeServices = self
            .invoke_json("ecs", "describe-services", &extra)
            .await?;
        response.into_summaries()
    }
}

#[async_trait]
impl ClusterOps for AwsCliBackend {
    async fn list_nodes(&self, cluster: &ClusterName) -> Result<Vec<Node>, AccessError> {
        // The client follows pagination itself, so one call yields every id.
        let listed: ListContainerInstances = self
            .invoke_json(
                "ecs",
                "list-container-instances",
                &["--cluster".to_string(), cluster.to_string()],
            )
            .await?;

        if listed.container_instance_arns.is_empty() {
            return Ok(Vec::new());
        }

        let batches = listed
            .container_instance_arns
            .chunks(DESCRIBE_NODES_BATCH)
            .map(|chunk| self.describe_nodes(cluster, chunk));
        let described = futures::future::try_join_all(batches).await?;

        Ok(described.into_iter().flatten().collect())
    }

    async fn update_node_status(
        &self,
        cluster: &ClusterName,
        nodes: &[NodeId],
        status: &NodeStatus,
    ) -> Result<(), AccessError> {
        for chunk in nodes.chunks(UPDATE_NODES_BATCH) {
            let mut extra = vec![
                "--cluster".to_string(),
                cluster.to_string(),
                "--status".to_string(),
                status.to_string(),
                "--container-instances".to_string(),
            ];
            extra.extend(chunk.iter().map(|id| id.to_string()));

            let response: UpdateContainerInstancesState = self
                .invoke_json("ecs", "update-container-instances-state", &extra)
                .await?;
            if let Some(err) = failures_to_error(&response.failures) {
                return Err(err);
            }
        }
        Ok(())
    }

    async fn list_services(
        &self,
        cluster: &ClusterName,
    ) -> Result<Vec<ServiceSummary>, AccessError> {
        let listed: ListServices = self
            .invoke_json(
                "ecs",
                "list-services",
                &["--cluster".to_string(), cluster.to_string()],
            )
            .await?;

        if listed.service_arns.is_empty() {
            return Ok(Vec::new());
        }

        let batches = listed
            .service_arns
            .chunks(DESCRIBE_SERVICES_BATCH)
            .map(|chunk| self.describe_services(cluster, chunk));
        let described = futures::future::try_join_all(batches).await?;

        Ok(described.into_iter().flatten().collect())
    }
}

#[async_trait]
impl GroupOps for AwsCliBackend {
    async fn describe_group(&self, group: &GroupName) -> Result<Group, AccessError> {
        let response: DescribeAutoScalingGroups = self
            .invoke_json(
                "autoscaling",
                "describe-auto-scaling-groups",
                &[
                    "--auto-scaling-group-names".to_string(),
                    group.to_string(),
                ],
            )
            .await?;

        response
            .auto_scaling_groups
            .into_iter()
            .next()
            .map(AutoScalingGroup::into_group)
            .ok_or_else(|| AccessError::NotFound(format!("autoscaling group {group}")))?
    }

    async fn set_desired_capacity(
        &self,
        group: &GroupName,
        desired: u32,
    ) -> Result<(), AccessError> {
        self.invoke(
            "autoscaling",
            "set-desired-capacity",
            &[
                "--auto-scaling-group-name".to_string(),
                group.to_string(),
                "--desired-capacity".to_string(),
                desired.to_string(),
            ],
        )
        .await
        .map(|_| ())
    }
}

// =============================================================================
// Response Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListContainerInstances {
    #[serde(default)]
    container_instance_arns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeContainerInstances {
    #[serde(default)]
    container_instances: Vec<ContainerInstance>,
    #[serde(default)]
    failures: Vec<Failure>,
}

impl DescribeContainerInstances {
    fn into_nodes(self) -> Result<Vec<Node>, AccessError> {
        // A node deregistered between list and describe is reported as MISSING;
        // it is simply absent from the snapshot.
        let hard_failures: Vec<Failure> = self
            .failures
            .into_iter()
            .filter(|f| f.reason.as_deref() != Some("MISSING"))
            .collect();
        if let Some(err) = failures_to_error(&hard_failures) {
            return Err(err);
        }

        Ok(self
            .container_instances
            .into_iter()
            .map(ContainerInstance::into_node)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerInstance {
    container_instance_arn: String,
    #[serde(default)]
    ec2_instance_id: Option<String>,
    status: String,
    #[serde(default)]
    running_tasks_count: u32,
    #[serde(default)]
    pending_tasks_count: u32,
    #[serde(default)]
    agent_connected: bool,
    #[serde(default)]
    registered_at: Option<serde_json::Value>,
}

impl ContainerInstance {
    fn into_node(self) -> Node {
        Node {
            id: NodeId::new(self.container_instance_arn),
            instance_id: self.ec2_instance_id.map(InstanceId::new),
            status: NodeStatus::parse(&self.status),
            running_tasks: self.running_tasks_count,
            pending_tasks: self.pending_tasks_count,
            agent_connected: self.agent_connected,
            registered_at: self.registered_at.as_ref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateContainerInstancesState {
    #[serde(default)]
    failures: Vec<Failure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListServices {
    #[serde(default)]
    service_arns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeServices {
    #[serde(default)]
    services: Vec<Service>,
    #[serde(default)]
    failures: Vec<Failure>,
}

impl DescribeServices {
    fn into_summaries(self) -> Result<Vec<ServiceSummary>, AccessError> {
        if let Some(err) = failures_to_error(&self.failures) {
            return Err(err);
        }
        Ok(self.services.into_iter().map(Service::into_summary).collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Service {
    service_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    desired_count: u32,
    #[serde(default)]
    running_count: u32,
    #[serde(default)]
    pending_count: u32,
    #[serde(default)]
    task_definition: String,
    #[serde(default)]
    launch_type: Option<String>,
}

impl Service {
    fn into_summary(self) -> ServiceSummary {
        ServiceSummary {
            name: self.service_name,
            status: self.status,
            desired: self.desired_count,
            running: self.running_count,
            pending: self.pending_count,
            task_definition: self.task_definition,
            launch_type: self.launch_type,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Failure {
    #[serde(default)]
    arn: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAutoScalingGroups {
    #[serde(default)]
    auto_scaling_groups: Vec<AutoScalingGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AutoScalingGroup {
    auto_scaling_group_name: String,
    min_size: u32,
    max_size: u32,
    desired_capacity: u32,
    #[serde(default)]
    instances: Vec<GroupInstance>,
    #[serde(default)]
    termination_policies: Vec<String>,
}

impl AutoScalingGroup {
    fn into_group(self) -> Result<Group, AccessError> {
        let name = GroupName::new(&self.auto_scaling_group_name)
            .map_err(|e| AccessError::Malformed(e.to_string()))?;
        Ok(Group {
            name,
            desired: self.desired_capacity,
            min: self.min_size,
            max: self.max_size,
            instances: self
                .instances
                .into_iter()
                .map(|i| InstanceId::new(i.instance_id))
                .collect(),
            termination_policies: self.termination_policies,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupInstance {
    instance_id: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn failures_to_error(failures: &[Failure]) -> Option<AccessError> {
    if failures.is_empty() {
        return None;
    }
    let detail = failures
        .iter()
        .map(|f| {
            format!(
                "{} ({})",
                f.arn.as_deref().unwrap_or("<unknown>"),
                f.reason.as_deref().unwrap_or("no reason given")
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(AccessError::Remote(detail))
}

/// Map the client's stderr onto an access error kind.
fn classify_failure(stderr: &str) -> AccessError {
    let message = stderr.trim().to_string();

    const AUTH: &[&str] = &[
        "AccessDenied",
        "UnrecognizedClient",
        "ExpiredToken",
        "InvalidClientTokenId",
        "AuthFailure",
        "Unable to locate credentials",
    ];
    const THROTTLED: &[&str] = &["Throttling", "Rate exceeded", "RequestLimitExceeded"];
    const NOT_FOUND: &[&str] = &["ClusterNotFoundException", "ServiceNotFoundException"];

    if AUTH.iter().any(|m| message.contains(m)) {
        AccessError::Auth(message)
    } else if THROTTLED.iter().any(|m| message.contains(m)) {
        AccessError::Throttled(message)
    } else if NOT_FOUND.iter().any(|m| message.contains(m)) {
        AccessError::NotFound(message)
    } else {
        AccessError::Remote(message)
    }
}

/// Version 2 of the client prints ISO-8601 strings, version 1 prints epoch seconds.
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => {
            let secs = n.as_f64()?;
            Utc.timestamp_millis_opt((secs * 1000.0) as i64).single()
        }
        _ => None,
    }
}
