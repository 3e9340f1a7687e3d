/// Backoff for flaky collaborator calls (classifier requests)

use crate::error::RouterError;
use std::future::Future;
use std::time::Duration;

pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// `attempt` counts failures so far, starting at 1.
    fn should_retry(&self, attempt: u32, error: &RouterError) -> bool;
    fn delay(&self, attempt: u32) -> Duration;
}

#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetry {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl ExponentialBackoffRetry {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            jitter: true,
        }
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for ExponentialBackoffRetry {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200), Duration::from_secs(2))
    }
}

impl RetryPolicy for ExponentialBackoffRetry {
    fn should_retry(&self, attempt: u32, error: &RouterError) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    fn delay(&self, attempt: u32) -> Duration {
        let doubled = self.initial_delay.saturating_mul(1u32 << attempt.min(16));
        let capped = doubled.min(self.max_delay);
        if !self.jitter {
            return capped;
        }
        // spread in [0.75, 1.0), fixed per attempt
        let spread = (attempt.wrapping_mul(7919) % 100) as f64 / 400.0;
        capped.mul_f64(0.75 + spread)
    }
}

/// Calls `call` until it succeeds or the policy gives up, returning the last error.
pub async fn retry_with_policy<F, Fut, T>(policy: &dyn RetryPolicy, mut call: F) -> Result<T, RouterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RouterError>>,
{
    let mut failures = 0;
    loop {
        let error = match call().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        failures += 1;
        if !policy.should_retry(failures, &error) {
            return Err(error);
        }
        let delay = policy.delay(failures);
        tracing::debug!(attempt = failures, ?delay, error = %error, "Retrying collaborator call");
        tokio::time::sleep(delay).await;
    }
}
