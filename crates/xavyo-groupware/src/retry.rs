//! Fixed-delay retry for groupware calls.

use crate::error::{GroupwareError, GroupwareResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy configuration.
///
/// `max_attempts` counts every call including the first one, so a policy
/// with `max_attempts: 3` issues at most three requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (1 = no retries).
    pub max_attempts: u32,
    /// Fixed wait between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(15_000),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Whether another attempt should follow the failed `attempt` (1-based).
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &GroupwareError) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    /// Execute an async operation with retry.
    ///
    /// The closure `f` is called until it succeeds, returns a non-retryable
    /// error, or `max_attempts` calls have failed. Exhaustion is reported as
    /// [`GroupwareError::RequestFailed`]; the last underlying error is only
    /// logged.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> GroupwareResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = GroupwareResult<T>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            operation = operation_name,
                            attempt,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => {
                    if !self.should_retry(attempt, &error) {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %error,
                            "Max attempts exceeded"
                        );
                        return Err(GroupwareError::RequestFailed { attempts: attempt });
                    }

                    warn!(
                        operation = operation_name,
                        attempt,
                        remaining_attempts = self.max_attempts - attempt,
                        delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Retrying groupware request"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(15));
    }

    #[test]
    fn test_should_retry_within_budget() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let error = GroupwareError::Fault("busy".into());

        assert!(policy.should_retry(1, &error));
        assert!(policy.should_retry(2, &error));
        assert!(!policy.should_retry(3, &error));
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::new(1, Duration::ZERO);
        assert!(!policy.should_retry(1, &GroupwareError::Fault("busy".into())));
    }

    #[test]
    fn test_should_not_retry_classified_error() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let error = GroupwareError::MemberAlreadyInGroup("x".into());
        assert!(!policy.should_retry(1, &error));
    }

    #[tokio::test]
    async fn test_execute_succeeds_after_retries() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(GroupwareError::EmptyFault { status: 503 })
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_non_retryable_fails_immediately() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: GroupwareResult<()> = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(GroupwareError::PrimaryMailMismatch("x".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(GroupwareError::PrimaryMailMismatch(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_max_attempts_exceeded() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: GroupwareResult<()> = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(GroupwareError::Fault("busy".into()))
                }
            })
            .await;

        match result {
            Err(GroupwareError::RequestFailed { attempts }) => assert_eq!(attempts, 2),
            other => panic!("Expected RequestFailed, got: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_waits_between_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_secs(15));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let started = tokio::time::Instant::now();

        let result = policy
            .execute("test_op", move || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(GroupwareError::Fault("busy".into()))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_secs(15));
    }
}
