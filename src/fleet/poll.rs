// ABOUTME: Fixed-interval, deadline-bounded, cancellable polling.
// ABOUTME: Shared by the drain waiter and the renewal's registration wait.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{FleetError, Result, ValidationError};

/// How often to poll and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl PollPolicy {
    pub fn new(
        interval: Duration,
        deadline: Duration,
    ) -> std::result::Result<Self, ValidationError> {
        if interval.is_zero() {
            return Err(ValidationError::InvalidPolicy(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if interval > deadline {
            return Err(ValidationError::InvalidPolicy(format!(
                "poll interval {}s exceeds deadline {}s",
                interval.as_secs(),
                deadline.as_secs()
            )));
        }
        Ok(Self { interval, deadline })
    }
}

/// Outcome of a poll loop whose condition was met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of checks performed, including the successful one.
    pub polls: u32,
    /// Time from the first check until the condition held.
    pub elapsed: Duration,
}

/// Run `check` every `policy.interval` until it returns `true`.
///
/// The deadline bounds the whole loop: the last sleep is cut short so the
/// timeout lands on the deadline, and a check still running at the deadline
/// is dropped. Cancellation interrupts both the sleep and an in-flight check.
pub async fn poll_until<F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    waiting_for: &str,
    mut check: F,
) -> Result<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let deadline = start + policy.deadline;
    let mut polls = 0u32;
    let timeout = |polls: u32| FleetError::Timeout {
        waiting_for: waiting_for.to_string(),
        polls,
        elapsed: start.elapsed(),
    };

    loop {
        if Instant::now() >= deadline {
            return Err(timeout(polls));
        }

        polls += 1;
        let done = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FleetError::Cancelled),
            result = tokio::time::timeout_at(deadline, check()) => match result {
                Ok(result) => result?,
                Err(_) => return Err(timeout(polls)),
            },
        };

        if done {
            return Ok(PollReport {
                polls,
                elapsed: start.elapsed(),
            });
        }

        let pause = policy.interval.min(deadline.saturating_duration_since(Instant::now()));
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FleetError::Cancelled),
            () = tokio::time::sleep(pause) => {}
        }
    }
}
