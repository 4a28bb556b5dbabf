// ABOUTME: Error type shared by every remote call.
// ABOUTME: Distinguishes auth, throttling, missing resources and transport failures.

/// A remote call failed.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("failed to invoke backend: {0}")]
    Spawn(String),

    #[error("not authorized: {0}")]
    Auth(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("remote error: {0}")]
    Remote(String),
}
