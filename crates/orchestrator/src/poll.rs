//! Assistant invocation and run polling.

use std::time::Duration;

use assistant_core::{AssistantApi, AssistantError, MessageRole, RunStatus, ThreadHandle};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Default delay between run status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default time to wait for a run before giving up.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Messages fetched when looking for the assistant's reply.
const REPLY_LOOKBACK: u32 = 5;

/// How a run is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status checks.
    pub interval: Duration,
    /// Overall deadline measured from the first status check.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_RUN_TIMEOUT,
        }
    }
}

/// Result of waiting on a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run completed; holds the assistant's latest reply.
    Completed(String),
    /// The run ended without a reply.
    Failed {
        status: RunStatus,
        error: Option<String>,
    },
    /// No terminal status was seen before the deadline.
    TimedOut { elapsed: Duration },
}

/// Post a user message to a thread, start a run and wait for it.
pub async fn send_message(
    api: &dyn AssistantApi,
    thread: &ThreadHandle,
    text: &str,
    policy: &PollPolicy,
) -> Result<RunOutcome, AssistantError> {
    api.add_user_message(thread, text).await?;
    let run = api.create_run(thread).await?;
    debug!("Started run {} on {} ({})", run.id, thread, run.status);

    wait_for_run(api, thread, &run.id, policy).await
}

/// Poll a run until it reaches a terminal status or the deadline passes.
///
/// A terminal status observed on the final check wins over the timeout.
pub async fn wait_for_run(
    api: &dyn AssistantApi,
    thread: &ThreadHandle,
    run_id: &str,
    policy: &PollPolicy,
) -> Result<RunOutcome, AssistantError> {
    let started = Instant::now();

    loop {
        let run = api.retrieve_run(thread, run_id).await?;

        match run.status {
            RunStatus::Completed => {
                let reply = latest_reply(api, thread).await?;
                info!(
                    "Run {} completed after {:?}",
                    run_id,
                    started.elapsed()
                );
                return Ok(RunOutcome::Completed(reply));
            }
            status if status.is_failure() => {
                warn!(
                    "Run {} ended with status {}: {}",
                    run_id,
                    status,
                    run.last_error.as_deref().unwrap_or("no error detail")
                );
                return Ok(RunOutcome::Failed {
                    status,
                    error: run.last_error,
                });
            }
            status => debug!("Run {} is {}", run_id, status),
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            warn!("Run {} timed out after {:?}", run_id, elapsed);
            return Ok(RunOutcome::TimedOut { elapsed });
        }

        sleep(policy.interval.min(policy.timeout - elapsed)).await;
    }
}

/// Text of the newest assistant message posted after the latest user message.
///
/// Messages come back newest first, so the scan stops at the first user
/// message: anything older answers an earlier turn.
async fn latest_reply(api: &dyn AssistantApi, thread: &ThreadHandle) -> Result<String, AssistantError> {
    api.list_messages(thread, REPLY_LOOKBACK)
        .await?
        .into_iter()
        .take_while(|m| m.role != MessageRole::User)
        .find(|m| m.role == MessageRole::Assistant)
        .map(|m| m.text)
        .ok_or_else(|| {
            AssistantError::InvalidResponse(format!(
                "run completed but {} has no reply after the latest user message",
                thread
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_assistant::{FailingAssistant, ScriptedAssistant};

    fn fast_policy(timeout_ms: u64) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(5),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_completed_run_returns_reply() {
        let api = ScriptedAssistant::new().with_statuses(vec![
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::Completed,
        ]);
        let thread = api.create_thread().await.unwrap();

        let outcome = send_message(&api, &thread, "Hello", &fast_policy(1000))
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed("Echo: Hello".to_string()));
        assert_eq!(api.polls(), 3);
    }

    #[tokio::test]
    async fn test_failure_statuses() {
        for status in [
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Expired,
            RunStatus::Incomplete,
        ] {
            let api = ScriptedAssistant::ending_with(status);
            let thread = api.create_thread().await.unwrap();

            let outcome = send_message(&api, &thread, "Hello", &fast_policy(1000))
                .await
                .unwrap();

            match outcome {
                RunOutcome::Failed { status: got, .. } => assert_eq!(got, status),
                other => panic!("expected failure for {}, got {:?}", status, other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_when_never_terminal() {
        let api = ScriptedAssistant::never_completes();
        let thread = api.create_thread().await.unwrap();
        let policy = PollPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        };

        let outcome = send_message(&api, &thread, "Hello", &policy).await.unwrap();

        match outcome {
            RunOutcome::TimedOut { elapsed } => assert!(elapsed >= policy.timeout),
            other => panic!("expected timeout, got {:?}", other),
        }
        // One check at start, one per second, one at the deadline
        assert_eq!(api.polls(), 31);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requires_action_is_not_terminal() {
        let api = ScriptedAssistant::new().with_statuses(vec![RunStatus::RequiresAction]);
        let thread = api.create_thread().await.unwrap();

        let outcome = send_message(&api, &thread, "Hello", &PollPolicy::default())
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::TimedOut { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_before_deadline_is_not_timeout() {
        let mut statuses = vec![RunStatus::InProgress; 29];
        statuses.push(RunStatus::Completed);
        let api = ScriptedAssistant::new().with_statuses(statuses);
        let thread = api.create_thread().await.unwrap();

        let outcome = send_message(&api, &thread, "Hello", &PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed("Echo: Hello".to_string()));
    }

    #[tokio::test]
    async fn test_silent_completion_does_not_reuse_earlier_reply() {
        let api = ScriptedAssistant::new().with_silent_runs_after(1);
        let thread = api.create_thread().await.unwrap();
        let policy = fast_policy(1000);

        let first = send_message(&api, &thread, "first question", &policy)
            .await
            .unwrap();
        assert_eq!(first, RunOutcome::Completed("Echo: first question".to_string()));

        let err = send_message(&api, &thread, "second question", &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let api = FailingAssistant::new("connection refused");
        let thread = ThreadHandle::new("thread_missing");

        let err = send_message(&api, &thread, "Hello", &fast_policy(100))
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }
}
