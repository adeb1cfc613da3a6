//! # Retry Executor
//!
//! Wraps any fallible store operation with a fixed-backoff, bounded-attempt
//! retry loop. Each retry and the final exhaustion are logged for diagnosis;
//! the final failure always propagates to the caller, never swallowed.
//!
//! Store mutations are not guaranteed idempotent: a Create retried after a
//! timeout that actually committed can produce a duplicate. The executor does
//! not protect against this and callers must not assume idempotency.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Classifies errors as worth another attempt or definitively final.
pub trait RetryableError {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// Attempt budget and backoff schedule for a [`RetryExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed interval slept between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::constants::system::DEFAULT_RETRY_ATTEMPTS,
            backoff: Duration::from_millis(crate::constants::system::STORE_BACKOFF_MILLIS),
        }
    }
}

/// Executes operations with bounded retry and fixed backoff.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    /// Component name for logging
    name: String,
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(name: impl Into<String>, policy: RetryPolicy) -> Self {
        let name = name.into();
        info!(
            component = %name,
            max_attempts = policy.max_attempts,
            backoff_ms = policy.backoff.as_millis() as u64,
            "Retry executor initialized"
        );
        Self { name, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is exhausted. The last error is returned as-is.
    pub async fn execute<F, Fut, T, E>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let mut attempt: u32 = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    debug!(
                        component = %self.name,
                        operation = %operation_name,
                        attempt,
                        "Operation succeeded"
                    );
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => {
                    debug!(
                        component = %self.name,
                        operation = %operation_name,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return Err(err);
                }
                Err(err) if attempt >= self.policy.max_attempts => {
                    error!(
                        component = %self.name,
                        operation = %operation_name,
                        attempts = attempt,
                        error = %err,
                        "Retries exhausted, propagating final failure"
                    );
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        component = %self.name,
                        operation = %operation_name,
                        attempt,
                        backoff_ms = self.policy.backoff.as_millis() as u64,
                        error = %err,
                        "Operation failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.policy.backoff).await;
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
    use tokio_test::assert_ok;

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Transient => write!(f, "transient"),
                Self::Permanent => write!(f, "permanent"),
            }
        }
    }

    impl RetryableError for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    fn executor(max_attempts: u32) -> RetryExecutor {
        RetryExecutor::new(
            "test",
            RetryPolicy::new(max_attempts, Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = executor(3)
            .execute("op", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>(42)
                }
            })
            .await;

        assert_eq!(assert_ok!(result), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_within_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        // Fails twice, succeeds on the third attempt; budget is 3.
        let result = executor(3)
            .execute("op", || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(TestError::Transient)
                    } else {
                        Ok("recovered")
                    }
                }
            })
            .await;

        assert_eq!(assert_ok!(result), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_final_error_and_stops() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = executor(3)
            .execute("op", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Transient)
                }
            })
            .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = executor(3)
            .execute("op", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Permanent)
                }
            })
            .await;

        assert_eq!(result, Err(TestError::Permanent));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
