//! Retry utilities with exponential backoff and jitter.
//!
//! Only errors the caller marks as retryable are retried. Every attempt is
//! recorded so callers can inspect the schedule afterwards.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

/// Classification hook for errors passed through [`retry_async`].
pub trait Retryable {
    fn is_retryable(&self) -> bool;

    /// Short label recorded in the attempt log.
    fn error_class(&self) -> &'static str;
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay; the delay before retry `k` is `base_delay * 2^k` plus jitter.
    pub base_delay: Duration,
    /// Upper bound of the uniform jitter added to every delay.
    pub max_jitter: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
            max_jitter: Duration::from_secs(2),
            operation_name: "operation".to_string(),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Deterministic part of the delay before retry `retry` (first retry is 1).
    pub fn backoff_for_retry(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }

    /// Full delay before retry `retry`: backoff plus uniform jitter.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
        };
        self.backoff_for_retry(retry).saturating_add(jitter)
    }
}

/// One attempt of a retried call. Lives only for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationAttempt {
    /// 1-based attempt number
    pub attempt_number: u32,
    /// Sleep taken before this attempt
    pub delay_before: Duration,
    /// Error class when the attempt failed
    pub error_class: Option<&'static str>,
}

/// Result of a retry operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success {
        value: T,
        attempts: Vec<GenerationAttempt>,
    },
    /// Operation failed. `exhausted` is set when every attempt hit a retryable error.
    Failed {
        error: E,
        attempts: Vec<GenerationAttempt>,
        exhausted: bool,
    },
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success { .. })
    }

    pub fn attempts(&self) -> &[GenerationAttempt] {
        match self {
            RetryResult::Success { attempts, .. } | RetryResult::Failed { attempts, .. } => attempts,
        }
    }
}

/// Execute an async operation, retrying retryable errors with backoff.
///
/// The operation receives the 1-based attempt number.
pub async fn retry_async<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = Vec::with_capacity(max_attempts as usize);
    let mut attempt_number = 1u32;
    let mut delay_before = Duration::ZERO;

    loop {
        if !delay_before.is_zero() {
            tokio::time::sleep(delay_before).await;
        }

        match operation(attempt_number).await {
            Ok(value) => {
                attempts.push(GenerationAttempt {
                    attempt_number,
                    delay_before,
                    error_class: None,
                });
                return RetryResult::Success { value, attempts };
            }
            Err(e) => {
                attempts.push(GenerationAttempt {
                    attempt_number,
                    delay_before,
                    error_class: Some(e.error_class()),
                });

                if !e.is_retryable() {
                    debug!(
                        operation = %policy.operation_name,
                        attempt = attempt_number,
                        error = %e,
                        "Non-retryable failure"
                    );
                    return RetryResult::Failed {
                        error: e,
                        attempts,
                        exhausted: false,
                    };
                }

                if attempt_number >= max_attempts {
                    warn!(
                        operation = %policy.operation_name,
                        attempts = attempt_number,
                        error = %e,
                        "Retries exhausted"
                    );
                    return RetryResult::Failed {
                        error: e,
                        attempts,
                        exhausted: true,
                    };
                }

                delay_before = policy.delay_for_retry(attempt_number);
                warn!(
                    operation = %policy.operation_name,
                    attempt = attempt_number,
                    delay_ms = delay_before.as_millis() as u64,
                    error = %e,
                    "Retryable failure, backing off"
                );
                crate::metrics::record_retry(&policy.operation_name);
                attempt_number += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }

        fn error_class(&self) -> &'static str {
            match self {
                TestError::Transient => "transient",
                TestError::Fatal => "fatal",
            }
        }
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::new("test").with_base_delay(Duration::from_secs(2));

        assert_eq!(policy.backoff_for_retry(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_for_retry(2), Duration::from_secs(8));
        assert_eq!(policy.backoff_for_retry(3), Duration::from_secs(16));
        assert_eq!(policy.backoff_for_retry(4), Duration::from_secs(32));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::new("test");
        for retry in 1..=4 {
            let delay = policy.delay_for_retry(retry);
            let floor = policy.backoff_for_retry(retry);
            assert!(delay >= floor);
            assert!(delay <= floor + Duration::from_secs(2));
        }

        let no_jitter = RetryPolicy::new("test").with_max_jitter(Duration::ZERO);
        assert_eq!(no_jitter.delay_for_retry(1), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_retry_async_immediate_success() {
        let policy = RetryPolicy::new("test");
        let call_count = AtomicU32::new(0);

        let result = retry_async(&policy, |_| {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, TestError>(42) }
        })
        .await;

        assert!(result.is_success());
        assert_eq!(result.attempts().len(), 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_async_eventual_success() {
        let policy = RetryPolicy::new("test").with_base_delay(Duration::from_millis(10));
        let call_count = AtomicU32::new(0);

        let result = retry_async(&policy, |_| {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert!(result.is_success());
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        let classes: Vec<_> = result.attempts().iter().map(|a| a.error_class).collect();
        assert_eq!(classes, vec![Some("transient"), Some("transient"), None]);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let policy = RetryPolicy::new("test");
        let call_count = AtomicU32::new(0);

        let result = retry_async(&policy, |_| {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(TestError::Fatal) }
        })
        .await;

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        match result {
            RetryResult::Failed {
                exhausted, attempts, ..
            } => {
                assert!(!exhausted);
                assert_eq!(attempts[0].delay_before, Duration::ZERO);
            }
            RetryResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_schedule() {
        let policy = RetryPolicy::new("test");
        let started = tokio::time::Instant::now();

        let result = retry_async(&policy, |_| async { Err::<u32, _>(TestError::Transient) }).await;

        let attempts = result.attempts().to_vec();
        assert_eq!(attempts.len(), 5);
        assert_eq!(attempts[0].delay_before, Duration::ZERO);
        for (k, attempt) in attempts.iter().enumerate().skip(1) {
            let floor = Duration::from_secs(2 * 2u64.pow(k as u32));
            assert!(attempt.delay_before >= floor);
            assert!(attempt.delay_before <= floor + Duration::from_secs(2));
        }
        // 4 + 8 + 16 + 32 seconds of backoff at minimum
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(matches!(result, RetryResult::Failed { exhausted: true, .. }));
    }
}
