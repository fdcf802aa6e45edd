//! Bounded poll driver for asynchronous extraction tasks.
//!
//! Replaces open-ended `while status != done` loops with a driver that has
//! an explicit poll budget, a fixed interval, and a cancellation signal.
//! Cancellation stops polling; the already-submitted upstream task is not
//! retracted.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use terrasense_core::{TaskSnapshot, TaskStatus};

use crate::error::FetchError;

// ============================================================================
// Poll Policy
// ============================================================================

/// Budget and cadence for a polling loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Fixed interval between polls.
    pub interval: Duration,
    /// Maximum number of polls before the task is treated as timed out.
    pub max_polls: u32,
}

impl PollPolicy {
    /// Creates a policy.
    pub fn new(interval: Duration, max_polls: u32) -> Self {
        Self {
            interval,
            max_polls,
        }
    }

    /// Upper bound on how long a driven call can block.
    pub fn max_duration(&self) -> Duration {
        self.interval.saturating_mul(self.max_polls)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        // Extraction tasks typically complete within minutes.
        Self::new(Duration::from_secs(10), 60)
    }
}

// ============================================================================
// Poll Driver
// ============================================================================

/// Polls a task to completion within the policy's budget.
///
/// `poll` is invoked once per iteration with the 1-based poll number and
/// must return the task's current snapshot. The driver returns:
///
/// - `Ok(snapshot)` when the task reaches [`TaskStatus::Done`]
/// - [`FetchError::TaskFailed`] when the provider reports [`TaskStatus::Error`]
/// - [`FetchError::TaskTimeout`] when the budget is spent without a terminal state
/// - [`FetchError::Cancelled`] when the `cancel` watch flips to `true`
/// - any error the poll closure itself produced, unchanged
///
/// # Errors
///
/// See above.
pub async fn poll_until_done<F, Fut>(
    policy: &PollPolicy,
    cancel: Option<watch::Receiver<bool>>,
    mut poll: F,
) -> Result<TaskSnapshot, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<TaskSnapshot, FetchError>>,
{
    for attempt in 1..=policy.max_polls {
        if let Some(rx) = &cancel {
            if *rx.borrow() {
                info!(attempt, "Polling cancelled before poll");
                return Err(FetchError::Cancelled);
            }
        }

        let snapshot = poll(attempt).await?;
        debug!(
            task_id = %snapshot.task_id,
            status = %snapshot.status,
            progress = ?snapshot.progress_percent,
            attempt,
            "Polled task"
        );

        match snapshot.status {
            TaskStatus::Done => {
                info!(task_id = %snapshot.task_id, polls = attempt, "Task completed");
                return Ok(snapshot);
            }
            TaskStatus::Error => {
                warn!(task_id = %snapshot.task_id, polls = attempt, "Task failed upstream");
                return Err(FetchError::TaskFailed(format!(
                    "task {} reported error",
                    snapshot.task_id
                )));
            }
            TaskStatus::Submitted | TaskStatus::Processing => {
                if attempt < policy.max_polls {
                    sleep_or_cancel(policy.interval, cancel.clone()).await?;
                }
            }
        }
    }

    warn!(polls = policy.max_polls, "Poll budget exhausted");
    Err(FetchError::TaskTimeout {
        polls: policy.max_polls,
    })
}

/// Sleeps for the poll interval unless the cancel watch flips first.
async fn sleep_or_cancel(
    interval: Duration,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<(), FetchError> {
    match cancel {
        Some(mut rx) => {
            tokio::select! {
                () = tokio::time::sleep(interval) => Ok(()),
                changed = rx.wait_for(|cancelled| *cancelled) => match changed {
                    // Sender dropped without cancelling: keep polling.
                    Err(_) => Ok(()),
                    Ok(_) => Err(FetchError::Cancelled),
                },
            }
        }
        None => {
            tokio::time::sleep(interval).await;
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
