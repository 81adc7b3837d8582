//! Retry wrapper: exponential backoff around a fallible async operation.
//!
//! The first attempt runs immediately. After a retryable failure the caller
//! sleeps the current delay, the delay is multiplied by the backoff factor,
//! and the operation runs again. The final failure is returned unchanged.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BotError, ErrorKind};

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after every failed attempt.
    pub backoff_factor: f64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Failure kinds worth another attempt.
    pub retry_on: Vec<ErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            backoff_factor: 2.0,
            max_delay_ms: 30_000,
            retry_on: vec![ErrorKind::TransientNetwork],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay slept after failed attempt `attempt_number` (1-indexed).
    pub fn delay_for(&self, attempt_number: u32) -> Duration {
        if attempt_number == 0 {
            return Duration::ZERO;
        }
        let delay_ms = self.initial_delay_ms as f64
            * self.backoff_factor.powi((attempt_number - 1) as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64).max(0.0) as u64;
        Duration::from_millis(delay_ms)
    }

    pub fn should_retry(&self, attempt_number: u32) -> bool {
        attempt_number < self.max_attempts.max(1)
    }

    pub fn is_retryable(&self, err: &BotError) -> bool {
        self.retry_on.contains(&err.kind())
    }

    /// Worst-case time spent sleeping between attempts.
    pub fn max_total_delay(&self) -> Duration {
        (1..self.max_attempts.max(1)).map(|n| self.delay_for(n)).sum()
    }
}

/// Run `op` under `policy`, retrying failures whose kind is in `policy.retry_on`.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Result<T, BotError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BotError>>,
{
    retry_with(policy, label, |err: &BotError| policy.is_retryable(err), op).await
}

/// Generic form of [`retry`]: `should_retry` decides which failures get
/// another attempt. `policy.retry_on` is ignored.
pub async fn retry_with<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    should_retry: P,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(label, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !should_retry(&err) {
                    debug!(label, attempt, error = %err, "Failure is not retryable");
                    return Err(err);
                }
                if !policy.should_retry(attempt) {
                    warn!(label, attempt, error = %err, "Retry policy exhausted");
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                warn!(
                    label,
                    attempt,
                    max = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Attempt failed, will retry"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 100,
            backoff_factor: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn exponential_backoff_grows() {
        let policy = policy();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn respects_max_delay() {
        let policy = RetryPolicy {
            max_delay_ms: 5_000,
            ..Default::default()
        };
        assert_eq!(policy.delay_for(10), Duration::from_millis(5_000));
        assert!(policy.max_total_delay() <= Duration::from_millis(10_000));
    }

    #[test]
    fn exhaustion_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            ..Default::default()
        };
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[tokio::test(start_paused = true)]
    async fn fails_twice_then_succeeds() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = retry(&policy(), "flaky", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(BotError::TransientNetwork("connection reset".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // d + d*b = 100 + 200
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(350), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_propagates_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), BotError> = retry(&policy(), "down", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BotError::TransientNetwork("timed out".into())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientNetwork);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), BotError> = retry(&policy(), "404", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BotError::terminal("download", "HTTP 404")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::TerminalApi);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_runs_once() {
        let calls = AtomicU32::new(0);

        let result: Result<(), BotError> = retry(&RetryPolicy::single_attempt(), "once", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BotError::TransientNetwork("refused".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_predicate_controls_retries() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = retry_with(
            &policy(),
            "strings",
            |e: &String| e == "again",
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    match n {
                        1 => Err("again".to_string()),
                        _ => Err("stop".to_string()),
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err(), "stop");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
