// ABOUTME: Renewal error types with SNAFU context selectors.
// ABOUTME: Every failure carries the step at which the renewal stopped.

use snafu::Snafu;
use std::fmt;

use crate::error::ErrorKind;
use crate::fleet::FleetError;
use crate::types::ClusterName;

/// Steps of a renewal, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenewalStep {
    Discover,
    ScaleOut,
    AwaitRegistration,
    Drain,
    AwaitDrain,
    ScaleIn,
}

impl RenewalStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalStep::Discover => "discover",
            RenewalStep::ScaleOut => "scale-out",
            RenewalStep::AwaitRegistration => "await-registration",
            RenewalStep::Drain => "drain",
            RenewalStep::AwaitDrain => "await-drain",
            RenewalStep::ScaleIn => "scale-in",
        }
    }

    /// Whether any remote state may have changed before this step ran.
    pub fn follows_mutation(&self) -> bool {
        !matches!(self, RenewalStep::Discover | RenewalStep::ScaleOut)
    }
}

impl fmt::Display for RenewalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A renewal stopped before completion.
///
/// Nothing is rolled back: requests issued before the failing step stay in effect.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RenewalError {
    #[snafu(display("nothing to renew: cluster {cluster} has no nodes"))]
    EmptyCluster { cluster: ClusterName },

    #[snafu(display("renewal failed at {step}: {source}"))]
    Step {
        step: RenewalStep,
        source: FleetError,
    },
}

impl RenewalError {
    /// The step at which the renewal stopped.
    pub fn step(&self) -> RenewalStep {
        match self {
            RenewalError::EmptyCluster { .. } => RenewalStep::Discover,
            RenewalError::Step { step, .. } => *step,
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenewalError::EmptyCluster { .. } => ErrorKind::EmptyCluster,
            RenewalError::Step { source, .. } => source.kind(),
        }
    }
}
