// ABOUTME: Application-wide error types for noderoll.
// ABOUTME: Wraps configuration, fleet and renewal failures behind one kind() for exit handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::fleet::{FleetError, ValidationError};
use crate::renew::RenewalError;
use crate::types::NameError;

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any remote call.
    Validation,
    /// The remote API could not be reached or refused the request.
    Access,
    /// A renewal found no nodes to replace.
    EmptyCluster,
    /// A wait exceeded its deadline.
    Timeout,
    /// The operator interrupted a wait.
    Cancelled,
    /// Configuration could not be found or parsed.
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Renewal(#[from] RenewalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<NameError> for Error {
    fn from(err: NameError) -> Self {
        Error::Validation(ValidationError::InvalidName(err))
    }
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound(_) | Error::InvalidConfig(_) | Error::Io(_) | Error::Yaml(_) => {
                ErrorKind::Config
            }
            Error::Validation(_) => ErrorKind::Validation,
            Error::Fleet(e) => e.kind(),
            Error::Renewal(e) => e.kind(),
        }
    }

    /// Whether the operator interrupted the operation.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renew::RenewalStep;

    #[test]
    fn name_errors_are_validation() {
        let err: Error = NameError::Empty("cluster").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn cancelled_renewal_is_cancelled() {
        let err: Error = RenewalError::Step {
            step: RenewalStep::AwaitDrain,
            source: FleetError::Cancelled,
        }
        .into();
        assert!(err.is_cancelled());
    }

    #[test]
    fn missing_config_is_a_config_error() {
        let err = Error::ConfigNotFound(PathBuf::from("noderoll.yml"));
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
