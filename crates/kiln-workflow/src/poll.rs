//! Bounded fixed-interval polling of remote status snapshots.

use crate::error::{WorkflowError, WorkflowResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Polling schedule for one long-running remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Fixed wait between polls.
    pub interval: Duration,
    /// Number of polls before giving up with a timeout error.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    /// Five-minute interval, six-hour budget.
    fn default() -> Self {
        Self { interval: Duration::from_secs(5 * 60), max_attempts: 72 }
    }
}

/// Classification of a remote snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Not terminal yet; keep polling.
    Pending,
    /// Terminal success; return the snapshot.
    Succeeded,
    /// Terminal failure; stop with the reported state.
    Failed(String),
}

/// Polls `fetch` until `classify` reports a terminal state.
///
/// Sleeps `config.interval` between polls (never after a terminal one) and
/// returns `WorkflowError::PollTimeout` once `config.max_attempts` polls
/// stayed pending. Fetch errors propagate immediately.
pub async fn poll_until<T, F, Fut, C>(
    config: &PollConfig,
    operation: &str,
    mut fetch: F,
    classify: C,
) -> WorkflowResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WorkflowResult<T>>,
    C: Fn(&T) -> PollState,
{
    for attempt in 1..=config.max_attempts {
        let snapshot = fetch().await?;
        match classify(&snapshot) {
            PollState::Succeeded => {
                debug!(operation, attempt, "poll reached terminal success");
                return Ok(snapshot);
            }
            PollState::Failed(state) => {
                return Err(WorkflowError::TerminalFailure {
                    operation: operation.to_string(),
                    state,
                });
            }
            PollState::Pending => {
                debug!(operation, attempt, "still pending");
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.interval).await;
                }
            }
        }
    }

    Err(WorkflowError::PollTimeout {
        operation: operation.to_string(),
        attempts: config.max_attempts,
        waited: config.interval * config.max_attempts.saturating_sub(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    fn fast(max_attempts: u32) -> PollConfig {
        PollConfig { interval: Duration::from_millis(1), max_attempts }
    }

    fn scripted(statuses: &[&str]) -> RefCell<VecDeque<String>> {
        RefCell::new(statuses.iter().map(|s| (*s).to_string()).collect())
    }

    fn classify(status: &String) -> PollState {
        match status.as_str() {
            "succeeded" => PollState::Succeeded,
            "failed" => PollState::Failed(status.clone()),
            _ => PollState::Pending,
        }
    }

    #[tokio::test]
    async fn stops_on_the_poll_that_succeeds() {
        let statuses = scripted(&["running", "running", "succeeded", "unreachable"]);
        let polls = RefCell::new(0u32);
        let (statuses, polls) = (&statuses, &polls);

        let result = poll_until(
            &fast(10),
            "job",
            || async move {
                *polls.borrow_mut() += 1;
                Ok(statuses.borrow_mut().pop_front().unwrap())
            },
            classify,
        )
        .await
        .unwrap();

        assert_eq!(result, "succeeded");
        // Exactly 3 polls: the terminal one is not followed by another.
        assert_eq!(*polls.borrow(), 3);
    }

    #[tokio::test]
    async fn terminal_failure_stops_immediately() {
        let statuses = scripted(&["running", "failed", "unreachable"]);
        let statuses = &statuses;

        let err = poll_until(
            &fast(10),
            "fine-tuning job",
            || async move { Ok(statuses.borrow_mut().pop_front().unwrap()) },
            classify,
        )
        .await
        .unwrap_err();

        match err {
            WorkflowError::TerminalFailure { operation, state } => {
                assert_eq!(operation, "fine-tuning job");
                assert_eq!(state, "failed");
            }
            other => panic!("expected TerminalFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn never_succeeding_status_hits_the_attempt_budget() {
        let polls = RefCell::new(0u32);
        let polls = &polls;

        let err = poll_until(
            &fast(4),
            "deployment",
            || async move {
                *polls.borrow_mut() += 1;
                Ok("running".to_string())
            },
            classify,
        )
        .await
        .unwrap_err();

        assert_eq!(*polls.borrow(), 4);
        match err {
            WorkflowError::PollTimeout { operation, attempts, .. } => {
                assert_eq!(operation, "deployment");
                assert_eq!(attempts, 4);
            }
            other => panic!("expected PollTimeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let err = poll_until(
            &fast(3),
            "job",
            || async { Err::<String, _>(WorkflowError::MissingModelName) },
            classify,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::MissingModelName));
    }
}
