// ABOUTME: State transition methods for the renewal orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use nonempty::NonEmpty;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::backend::{ClusterBackend, ClusterOps, GroupOps, NodeStatus};
use crate::fleet::{self, FleetError};
use crate::types::{ClusterName, GroupName};

use super::error::{EmptyClusterSnafu, RenewalError, RenewalStep, StepSnafu};
use super::renewal::{Renewal, RenewalPlan, RenewalReport, RenewalSettings};
use super::state::{Completed, Discovered, Drained, Draining, Registered, ScaledOut};

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Renewal<S> {
    /// Internal helper to move to the next state.
    fn transition<T: Default>(self) -> Renewal<T> {
        Renewal {
            plan: self.plan,
            settings: self.settings,
            registration: self.registration,
            drain: self.drain,
            state: T::default(),
        }
    }
}

// =============================================================================
// Discover
// =============================================================================

impl Renewal<Discovered> {
    /// List the cluster's nodes and describe the group, producing the plan.
    ///
    /// Every node currently in the cluster is selected for replacement.
    ///
    /// # Errors
    ///
    /// - `RenewalError::EmptyCluster` if the cluster has no nodes
    /// - `RenewalError::Step` at `discover` for invalid settings, a failed query,
    ///   or a group whose maximum cannot hold old and new nodes side by side
    pub async fn discover<B: ClusterBackend + ?Sized>(
        backend: &B,
        cluster: &ClusterName,
        group: &GroupName,
        settings: RenewalSettings,
    ) -> Result<Self, RenewalError> {
        let step = StepSnafu {
            step: RenewalStep::Discover,
        };

        // Reject bad timing before anything is touched.
        settings.drain_policy().map_err(FleetError::from).context(step)?;
        if settings.await_registration {
            settings
                .registration_policy()
                .map_err(FleetError::from)
                .context(step)?;
        }

        let nodes = fleet::list_nodes(backend, cluster).await.context(step)?;
        let Some(nodes) = NonEmpty::from_vec(nodes) else {
            return EmptyClusterSnafu {
                cluster: cluster.clone(),
            }
            .fail();
        };

        let group = backend
            .describe_group(group)
            .await
            .map_err(FleetError::from)
            .context(step)?;

        let plan = RenewalPlan::new(cluster.clone(), group, nodes);
        fleet::validate_capacity(&plan.group, plan.scaled_desired)
            .map_err(FleetError::from)
            .context(step)?;

        tracing::info!(
            "renewing {} node(s) in {} via group {} (desired {} -> {} -> {})",
            plan.nodes.len(),
            plan.cluster,
            plan.group.name,
            plan.original_desired,
            plan.scaled_desired,
            plan.original_desired
        );

        Ok(Renewal {
            plan,
            settings,
            registration: None,
            drain: None,
            state: Discovered,
        })
    }

    /// Request the extra capacity that will host the replacement nodes.
    ///
    /// # Errors
    ///
    /// Returns a `scale-out` step error if the scaled capacity exceeds the
    /// group's maximum (nothing is requested) or if the request fails.
    #[must_use = "renewal state must be used"]
    pub async fn scale_out<G: GroupOps + ?Sized>(
        self,
        backend: &G,
    ) -> Result<Renewal<ScaledOut>, RenewalError> {
        fleet::set_group_capacity(backend, &self.plan.group, self.plan.scaled_desired)
            .await
            .context(StepSnafu {
                step: RenewalStep::ScaleOut,
            })?;
        Ok(self.transition())
    }
}

// =============================================================================
// ScaledOut -> Registered
// =============================================================================

impl Renewal<ScaledOut> {
    /// Wait until as many new ACTIVE nodes as are being replaced have joined.
    ///
    /// Does nothing when registration waiting is disabled in the settings.
    ///
    /// # Errors
    ///
    /// Returns an `await-registration` step error on timeout, cancellation or a
    /// failed query. The scale-out stays in effect.
    #[must_use = "renewal state must be used"]
    pub async fn await_registration<C: ClusterOps + ?Sized>(
        mut self,
        backend: &C,
        cancel: &CancellationToken,
    ) -> Result<Renewal<Registered>, RenewalError> {
        if !self.settings.await_registration {
            return Ok(self.skip_registration());
        }

        let step = StepSnafu {
            step: RenewalStep::AwaitRegistration,
        };
        let policy = self
            .settings
            .registration_policy()
            .map_err(FleetError::from)
            .context(step)?;

        let plan = &self.plan;
        let wanted = plan.nodes.len();
        let waiting_for = format!("{wanted} replacement node(s) to join {}", plan.cluster);
        let report = fleet::poll_until(policy, cancel, &waiting_for, move || async move {
            let snapshot = fleet::list_nodes(backend, &plan.cluster).await?;
            let joined = snapshot
                .iter()
                .filter(|n| n.status == NodeStatus::Active && !plan.includes(n))
                .count();
            tracing::debug!("{joined} of {wanted} replacement node(s) active");
            Ok(joined >= wanted)
        })
        .await
        .context(step)?;

        self.registration = Some(report);
        Ok(self.transition())
    }

    /// Proceed to draining without confirming that replacements have joined.
    #[must_use = "renewal state must be used"]
    pub fn skip_registration(self) -> Renewal<Registered> {
        tracing::warn!(
            "not waiting for replacement nodes in {}; draining immediately",
            self.plan.cluster
        );
        self.transition()
    }
}

// =============================================================================
// Registered -> Draining
// =============================================================================

impl Renewal<Registered> {
    /// Mark every planned node DRAINING in a single request.
    ///
    /// # Errors
    ///
    /// Returns a `drain` step error if the request fails.
    #[must_use = "renewal state must be used"]
    pub async fn drain<C: ClusterOps + ?Sized>(
        self,
        backend: &C,
    ) -> Result<Renewal<Draining>, RenewalError> {
        fleet::set_status(
            backend,
            &self.plan.cluster,
            &self.plan.node_ids(),
            &NodeStatus::Draining,
        )
        .await
        .context(StepSnafu {
            step: RenewalStep::Drain,
        })?;
        Ok(self.transition())
    }
}

// =============================================================================
// Draining -> Drained
// =============================================================================

impl Renewal<Draining> {
    /// Wait until every planned node is drained or has left the cluster.
    ///
    /// # Errors
    ///
    /// Returns an `await-drain` step error on timeout, cancellation or a failed
    /// query. Drains already requested are not reverted.
    #[must_use = "renewal state must be used"]
    pub async fn await_drain<C: ClusterOps + ?Sized>(
        mut self,
        backend: &C,
        cancel: &CancellationToken,
    ) -> Result<Renewal<Drained>, RenewalError> {
        let step = StepSnafu {
            step: RenewalStep::AwaitDrain,
        };
        let policy = self
            .settings
            .drain_policy()
            .map_err(FleetError::from)
            .context(step)?;

        let report = fleet::await_drained(
            backend,
            &self.plan.cluster,
            &self.plan.node_ids(),
            policy,
            cancel,
        )
        .await
        .context(step)?;

        self.drain = Some(report);
        Ok(self.transition())
    }
}

// =============================================================================
// Drained -> Completed
// =============================================================================

impl Renewal<Drained> {
    /// Restore the group's original desired capacity, retiring the old nodes.
    ///
    /// The group is described again so the bounds check uses current values.
    ///
    /// # Errors
    ///
    /// Returns a `scale-in` step error if the query or request fails.
    #[must_use = "renewal state must be used"]
    pub async fn scale_in<G: GroupOps + ?Sized>(
        self,
        backend: &G,
    ) -> Result<Renewal<Completed>, RenewalError> {
        let step = StepSnafu {
            step: RenewalStep::ScaleIn,
        };
        let group = backend
            .describe_group(&self.plan.group.name)
            .await
            .map_err(FleetError::from)
            .context(step)?;

        fleet::set_group_capacity(backend, &group, self.plan.original_desired)
            .await
            .context(step)?;
        Ok(self.transition())
    }
}

// =============================================================================
// Completed - Terminal State
// =============================================================================

impl Renewal<Completed> {
    /// Consume the renewal and summarize it.
    pub fn finish(self) -> RenewalReport {
        RenewalReport {
            replaced: self.plan.node_ids(),
            cluster: self.plan.cluster,
            group: self.plan.group.name,
            scaled_to: self.plan.scaled_desired,
            restored_to: self.plan.original_desired,
            registration_polls: self.registration.map(|r| r.polls),
            drain_polls: self.drain.map(|r| r.polls).unwrap_or_default(),
        }
    }
}
