//! Retries with doubling backoff for provider requests.
//!
//! The default policy makes one attempt, so a failed request fails the run
//! straight away. Retries are opt-in through `TRANSLATE_MAX_ATTEMPTS`.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How many times a request is attempted and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. 0 behaves like 1.
    pub attempts: u32,
    /// Wait before the second attempt; doubled for each one after
    pub first_delay: Duration,
    /// Upper bound for any single wait
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, first_delay: Duration) -> Self {
        Self {
            attempts,
            first_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn capped_at(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// One attempt, no waiting.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Provider requests: waits of 1s, 2s, 4s, then 8s for every later retry.
    pub fn backoff(attempts: u32) -> Self {
        Self::new(attempts, Duration::from_secs(1)).capped_at(Duration::from_secs(8))
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.max(1)
    }

    /// Wait before attempt number `attempt` (0 is the first attempt).
    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.first_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

/// Run `request` until it succeeds, fails with an error `is_retryable`
/// rejects, or the policy runs out of attempts. The last error is returned.
pub async fn retry_while<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    label: &str,
    mut request: F,
    is_retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let total = policy.total_attempts();
    let mut attempt = 0;

    loop {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            debug!("{}: waiting {:?} before attempt {}/{}", label, delay, attempt + 1, total);
            sleep(delay).await;
        }

        let error = match request().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        attempt += 1;
        if attempt >= total || !is_retryable(&error) {
            if attempt >= total && total > 1 {
                warn!("{}: giving up after {} attempts: {}", label, total, error);
            }
            return Err(error);
        }

        warn!("{}: attempt {}/{} failed: {}", label, attempt, total, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status(code: u16) -> ProviderError {
        ProviderError::Status {
            status: code,
            body: String::new(),
        }
    }

    /// Replays `script` one response per call, repeating the last entry.
    async fn scripted(
        policy: &RetryPolicy,
        calls: &AtomicU32,
        script: &[Result<&'static str, u16>],
    ) -> Result<&'static str, ProviderError> {
        retry_while(
            policy,
            "scripted",
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
                match script[n.min(script.len() - 1)] {
                    Ok(text) => Ok(text),
                    Err(code) => Err(status(code)),
                }
            },
            ProviderError::is_retryable,
        )
        .await
    }

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(5))
    }

    // ==================== Policy ====================

    #[test]
    fn test_default_is_single_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy, RetryPolicy::single_attempt());
        assert_eq!(policy.total_attempts(), 1);
        assert_eq!(policy.delay_before(1), Duration::ZERO);
    }

    #[test]
    fn test_zero_attempts_behaves_like_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).total_attempts(), 1);
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let policy = RetryPolicy::backoff(10);
        let delays: Vec<_> = (0..7).map(|n| policy.delay_before(n).as_secs()).collect();
        assert_eq!(delays, vec![0, 1, 2, 4, 8, 8, 8]);
    }

    #[test]
    fn test_large_attempt_numbers_saturate() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_millis(1))
            .capped_at(Duration::from_secs(60));
        assert_eq!(policy.delay_before(40), Duration::from_secs(60));
        assert_eq!(policy.delay_before(u32::MAX), Duration::from_secs(60));
    }

    // ==================== retry_while ====================

    #[tokio::test]
    async fn test_first_success_makes_one_call() {
        let calls = AtomicU32::new(0);
        let result = scripted(&quick(3), &calls, &[Ok("Bonjour")]).await;

        assert_eq!(result.unwrap(), "Bonjour");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_from_server_errors() {
        let calls = AtomicU32::new(0);
        let result = scripted(&quick(3), &calls, &[Err(503), Err(500), Ok("Bonjour")]).await;

        assert_eq!(result.unwrap(), "Bonjour");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result = scripted(&quick(3), &calls, &[Err(400)]).await;

        assert!(matches!(result, Err(ProviderError::Status { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_non_retryable_error() {
        let calls = AtomicU32::new(0);
        let result = scripted(&quick(5), &calls, &[Err(429), Err(403), Ok("late")]).await;

        assert!(matches!(result, Err(ProviderError::Status { status: 403, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let result = scripted(&quick(4), &calls, &[Err(500), Err(502), Err(503), Err(504)]).await;

        assert!(matches!(result, Err(ProviderError::Status { status: 504, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_single_attempt_ignores_retryable_errors() {
        let calls = AtomicU32::new(0);
        let result = scripted(&RetryPolicy::single_attempt(), &calls, &[Err(503)]).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ==================== Timing ====================

    #[tokio::test]
    async fn test_waits_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(50));
        let calls = AtomicU32::new(0);
        let start = std::time::Instant::now();

        let _ = scripted(&policy, &calls, &[Err(500)]).await;

        // 50ms + 100ms
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(150), "waited only {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(600), "waited too long: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_no_wait_on_immediate_success() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        let calls = AtomicU32::new(0);
        let start = std::time::Instant::now();

        scripted(&policy, &calls, &[Ok("fast")]).await.unwrap();

        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
