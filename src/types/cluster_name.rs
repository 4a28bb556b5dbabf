// ABOUTME: Validated cluster and capacity-group identifiers.
// ABOUTME: Accepts short names or full resource names, rejects anything the remote API would.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("{0} name cannot be empty")]
    Empty(&'static str),

    #[error("{0} name exceeds maximum length of 255 characters")]
    TooLong(&'static str),

    #[error("invalid character in {0} name: '{1}'")]
    InvalidChar(&'static str, char),
}

fn validate(
    kind: &'static str,
    value: &str,
    allowed: impl Fn(char) -> bool,
) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty(kind));
    }

    if value.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong(kind));
    }

    // Full resource names carry ':' and '/' and are passed through verbatim.
    if value.starts_with("arn:") {
        return Ok(());
    }

    for c in value.chars() {
        if !allowed(c) {
            return Err(NameError::InvalidChar(kind, c));
        }
    }

    Ok(())
}

/// Name of a cluster: letters, digits, hyphens and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClusterName(String);

impl ClusterName {
    pub fn new(value: &str) -> Result<Self, NameError> {
        validate("cluster", value, |c| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_'
        })?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ClusterName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ClusterName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Name of an autoscaling capacity group.
///
/// Group names allow most printable characters but never a colon outside a
/// full resource name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    pub fn new(value: &str) -> Result<Self, NameError> {
        validate("group", value, |c| !c.is_control() && c != ':')?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GroupName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for GroupName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}
