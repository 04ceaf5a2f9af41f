//! Retry policy and backoff schedule

use crate::types::BackoffType;
use std::time::Duration;

/// How often, and how patiently, a remote call is retried.
///
/// `max_attempts` counts every try, including the first one, so a policy with
/// `max_attempts = 10` sleeps at most nine times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// First delay of the schedule
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Total number of tries
    pub max_attempts: u32,
    /// Shape of the delay sequence
    pub backoff: BackoffType,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            max_attempts: 10,
            backoff: BackoffType::Fibonacci,
        }
    }
}

impl RetryPolicy {
    /// Fibonacci policy with the given base delay and attempt budget
    pub fn fibonacci(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            ..Self::default()
        }
    }

    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set the backoff shape
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the delay cap
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Attempt budget, never less than one try
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the `retry`-th failure (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = match self.backoff {
            BackoffType::Constant => 1,
            BackoffType::Linear => retry.saturating_add(1),
            BackoffType::Exponential => 2u32.saturating_pow(retry),
            BackoffType::Fibonacci => fibonacci(retry),
        };

        std::cmp::min(self.base_delay.saturating_mul(factor), self.max_delay)
    }

    /// Every delay the policy can produce, in order
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.attempts() - 1).map(|retry| self.delay_for(retry))
    }
}

/// 1, 2, 3, 5, 8, ... saturating at `u32::MAX`
fn fibonacci(n: u32) -> u32 {
    let (mut a, mut b) = (1u32, 2u32);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}
