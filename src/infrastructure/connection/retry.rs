//! Bounded retry combinator for connection establishment.
//!
//! Attempts are spaced by a flat delay (no growth, no jitter); the attempt
//! ceiling is low enough that a fixed interval is all that is needed. Built on
//! `tokio-retry`'s [`FixedInterval`] strategy.

use std::future::Future;
use std::time::Duration;

use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `operation` until it succeeds or `policy.max_attempts` calls have failed.
///
/// `operation` receives the one-based attempt number. It is never called more
/// than `max_attempts` times.
pub async fn attempt<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let retries = policy.max_attempts.max(1) as usize - 1;
    let strategy = FixedInterval::new(policy.delay).take(retries);

    let mut attempts = 0u32;
    let result = Retry::start(strategy, || {
        attempts += 1;
        operation(attempts)
    })
    .await;

    result.map_err(|last_error| Exhausted {
        attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_first_time() {
        let result: Result<u32, Exhausted<&str>> = attempt(fast(3), |n| async move { Ok(n) }).await;
        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let result = attempt(fast(3), |n| async move {
            if n < 3 { Err("down") } else { Ok(n) }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stops_at_ceiling() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = attempt(fast(3), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("down")
            }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last_error, "down");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_ceiling_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(policy.max_attempts, 1);

        let result: Result<(), _> = attempt(policy, |_| async { Err("down") }).await;
        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_flat_delay_between_attempts() {
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = attempt(
            RetryPolicy::new(3, Duration::from_secs(1)),
            |_| async { Err("down") },
        )
        .await;

        assert!(result.is_err());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }
}
