// ABOUTME: Error types for node and group operations.
// ABOUTME: Separates caller mistakes (validation) from remote failures, timeouts and cancellation.

use std::time::Duration;

use crate::backend::AccessError;

/// Bad caller input, detected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one node id is required")]
    EmptyNodeList,

    #[error("invalid node status '{0}': expected ACTIVE or DRAINING")]
    InvalidStatus(String),

    #[error("desired capacity {desired} is outside the bounds of group {group} (min {min}, max {max})")]
    CapacityOutOfRange {
        group: String,
        desired: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid poll policy: {0}")]
    InvalidPolicy(String),

    #[error("{0}")]
    InvalidName(#[from] crate::types::NameError),
}

/// Errors from registry queries, mutations and waits.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Access(#[from] AccessError),

    /// The condition did not hold before the deadline. Advisory: already
    /// issued requests stay in effect.
    #[error("timed out after {}s ({polls} polls) waiting for {waiting_for}", .elapsed.as_secs())]
    Timeout {
        waiting_for: String,
        polls: u32,
        elapsed: Duration,
    },

    #[error("cancelled by operator")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, FleetError>;

impl FleetError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> crate::error::ErrorKind {
        use crate::error::ErrorKind;
        match self {
            FleetError::Validation(_) => ErrorKind::Validation,
            FleetError::Access(_) => ErrorKind::Access,
            FleetError::Timeout { .. } => ErrorKind::Timeout,
            FleetError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn timeout_message_reports_polls_and_elapsed() {
        let err = FleetError::Timeout {
            waiting_for: "2 node(s) to drain".to_string(),
            polls: 6,
            elapsed: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "timed out after 30s (6 polls) waiting for 2 node(s) to drain"
        );
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn validation_errors_convert() {
        let err: FleetError = ValidationError::EmptyNodeList.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
