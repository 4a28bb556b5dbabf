// ABOUTME: Test support utilities.
// ABOUTME: Provides an in-memory cluster and capacity group that record every call.

use std::sync::Once;

use async_trait::async_trait;
use noderoll::backend::{
    AccessError, ClusterOps, Group, GroupOps, Node, NodeStatus, ServiceSummary,
};
use noderoll::types::{ClusterName, GroupName, InstanceId, NodeId};
use parking_lot::Mutex;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("noderoll=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Remote operations a test can make fail.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    ListNodes,
    UpdateStatus,
    ListServices,
    DescribeGroup,
    SetCapacity,
}

/// When nodes asked to drain report zero running tasks.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainBehaviour {
    /// Tasks have moved by the n-th listing after the drain request.
    AfterPolls(u32),
    /// Tasks never move.
    Never,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub list_nodes: u32,
    pub list_services: u32,
    pub describe_group: u32,
    pub status_updates: Vec<(Vec<NodeId>, NodeStatus)>,
    pub capacity_requests: Vec<u32>,
}

impl Calls {
    /// Number of requests that changed remote state.
    #[allow(dead_code)]
    pub fn mutations(&self) -> usize {
        self.status_updates.len() + self.capacity_requests.len()
    }

    #[allow(dead_code)]
    pub fn remote_calls(&self) -> usize {
        self.mutations()
            + (self.list_nodes + self.list_services + self.describe_group) as usize
    }
}

struct State {
    nodes: Vec<Node>,
    group: Option<Group>,
    services: Vec<ServiceSummary>,
    drain: DrainBehaviour,
    listings_since_drain: Option<u32>,
    register_on_scale_out: bool,
    failing: Option<(Op, fn() -> AccessError)>,
    next_id: u32,
    calls: Calls,
}

/// In-memory cluster backend.
///
/// Scale-out adds ACTIVE nodes, drained nodes lose their tasks according to the
/// configured [`DrainBehaviour`], and scale-in removes drained nodes first.
pub struct FakeCluster {
    state: Mutex<State>,
}

#[allow(dead_code)]
impl FakeCluster {
    /// A cluster with `nodes` ACTIVE nodes, each running two tasks, backed by a
    /// group with the given bounds and an oldest-first termination policy.
    pub fn new(nodes: u32, desired: u32, min: u32, max: u32) -> Self {
        let mut state = State {
            nodes: Vec::new(),
            group: Some(Group {
                name: GroupName::new("asg-demo").unwrap(),
                desired,
                min,
                max,
                instances: Vec::new(),
                termination_policies: vec!["OldestInstance".to_string()],
            }),
            services: Vec::new(),
            drain: DrainBehaviour::AfterPolls(1),
            listings_since_drain: None,
            register_on_scale_out: true,
            failing: None,
            next_id: 0,
            calls: Calls::default(),
        };
        for _ in 0..nodes {
            state.add_node(2);
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// A cluster with no nodes.
    pub fn empty() -> Self {
        Self::new(0, 0, 0, 4)
    }

    pub fn with_drain(self, drain: DrainBehaviour) -> Self {
        self.state.lock().drain = drain;
        self
    }

    pub fn without_registration(self) -> Self {
        self.state.lock().register_on_scale_out = false;
        self
    }

    pub fn with_termination_policies(self, policies: &[&str]) -> Self {
        if let Some(group) = self.state.lock().group.as_mut() {
            group.termination_policies = policies.iter().map(|p| p.to_string()).collect();
        }
        self
    }

    pub fn without_group(self) -> Self {
        self.state.lock().group = None;
        self
    }

    pub fn with_services(self, services: Vec<ServiceSummary>) -> Self {
        self.state.lock().services = services;
        self
    }

    /// Make every call to `op` fail with the error built by `err`.
    pub fn failing(self, op: Op, err: fn() -> AccessError) -> Self {
        self.state.lock().failing = Some((op, err));
        self
    }

    /// Make `op` fail from now on.
    pub fn fail_from_now(&self, op: Op, err: fn() -> AccessError) {
        self.state.lock().failing = Some((op, err));
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.state.lock().nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.state.lock().nodes.clone()
    }

    pub fn group(&self) -> Option<Group> {
        self.state.lock().group.clone()
    }

    pub fn set_agent_connected(&self, index: usize, connected: bool) {
        self.state.lock().nodes[index].agent_connected = connected;
    }

    /// Inspect recorded calls.
    pub fn calls<R>(&self, f: impl FnOnce(&Calls) -> R) -> R {
        f(&self.state.lock().calls)
    }
}

impl State {
    fn add_node(&mut self, running_tasks: u32) {
        self.next_id += 1;
        let short = format!("node{:04}", self.next_id);
        let instance = format!("i-{:08x}", self.next_id);
        self.nodes.push(Node {
            id: NodeId::new(format!(
                "arn:aws:ecs:eu-west-1:123456789012:container-instance/demo/{short}"
            )),
            instance_id: Some(InstanceId::new(instance.clone())),
            status: NodeStatus::Active,
            running_tasks,
            pending_tasks: 0,
            agent_connected: true,
            registered_at: None,
        });
        if let Some(group) = self.group.as_mut() {
            group.instances.push(InstanceId::new(instance));
        }
    }

    fn check(&self, op: Op) -> Result<(), AccessError> {
        match self.failing {
            Some((failing, err)) if failing == op => Err(err()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterOps for FakeCluster {
    async fn list_nodes(&self, _cluster: &ClusterName) -> Result<Vec<Node>, AccessError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.calls.list_nodes += 1;
        state.check(Op::ListNodes)?;

        if let Some(seen) = state.listings_since_drain.as_mut() {
            *seen += 1;
            let seen = *seen;
            if matches!(state.drain, DrainBehaviour::AfterPolls(n) if seen >= n) {
                for node in state
                    .nodes
                    .iter_mut()
                    .filter(|n| n.status == NodeStatus::Draining)
                {
                    node.running_tasks = 0;
                }
            }
        }
        Ok(state.nodes.clone())
    }

    async fn update_node_status(
        &self,
        _cluster: &ClusterName,
        nodes: &[NodeId],
        status: &NodeStatus,
    ) -> Result<(), AccessError> {
        let mut state = self.state.lock();
        state
            .calls
            .status_updates
            .push((nodes.to_vec(), status.clone()));
        state.check(Op::UpdateStatus)?;

        for node in state
            .nodes
            .iter_mut()
            .filter(|n| nodes.iter().any(|id| n.matches(id.as_str())))
        {
            node.status = status.clone();
        }
        if *status == NodeStatus::Draining {
            state.listings_since_drain = Some(0);
        }
        Ok(())
    }

    async fn list_services(
        &self,
        _cluster: &ClusterName,
    ) -> Result<Vec<ServiceSummary>, AccessError> {
        let mut state = self.state.lock();
        state.calls.list_services += 1;
        state.check(Op::ListServices)?;
        Ok(state.services.clone())
    }
}

#[async_trait]
impl GroupOps for FakeCluster {
    async fn describe_group(&self, group: &GroupName) -> Result<Group, AccessError> {
        let mut state = self.state.lock();
        state.calls.describe_group += 1;
        state.check(Op::DescribeGroup)?;
        state
            .group
            .clone()
            .filter(|g| &g.name == group)
            .ok_or_else(|| AccessError::NotFound(format!("group {group}")))
    }

    async fn set_desired_capacity(
        &self,
        _group: &GroupName,
        desired: u32,
    ) -> Result<(), AccessError> {
        let mut state = self.state.lock();
        state.calls.capacity_requests.push(desired);
        state.check(Op::SetCapacity)?;

        let current = state.group.as_ref().map(|g| g.desired).unwrap_or_default();
        if desired > current && state.register_on_scale_out {
            for _ in current..desired {
                state.add_node(0);
            }
        }
        if desired < current {
            // Oldest-first: the drained nodes leave before any replacement.
            let mut surplus = (current - desired) as usize;
            state.nodes.retain(|n| {
                if surplus > 0 && n.status == NodeStatus::Draining {
                    surplus -= 1;
                    false
                } else {
                    true
                }
            });
        }
        if let Some(group) = state.group.as_mut() {
            group.desired = desired;
        }
        Ok(())
    }
}
