use std::time::Duration;

use super::errors::ApiError;
use crate::domain::models::RetryConfig;

/// Retry policy configuration for handling transient errors
///
/// A call makes at most `max_retries + 1` attempts. The delay before retry
/// `n` (1-indexed) is `min(max_retry_delay, min_retry_delay * 2^(n-1))`.
/// There is no jitter; the shared rate limiter spreads concurrent callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    min_retry_delay: Duration,
    max_retry_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Example
    /// ```
    /// use cloudflare_api::infrastructure::api::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(30)).unwrap();
    /// assert_eq!(policy.backoff_for(3), Duration::from_secs(4));
    /// ```
    pub fn new(
        max_retries: u32,
        min_retry_delay: Duration,
        max_retry_delay: Duration,
    ) -> Result<Self, ApiError> {
        if min_retry_delay.is_zero() {
            return Err(ApiError::InvalidRetryPolicy(
                "min_retry_delay must be greater than 0".to_string(),
            ));
        }
        if max_retry_delay < min_retry_delay {
            return Err(ApiError::InvalidRetryPolicy(format!(
                "max_retry_delay ({max_retry_delay:?}) must be >= min_retry_delay ({min_retry_delay:?})"
            )));
        }

        Ok(Self {
            max_retries,
            min_retry_delay,
            max_retry_delay,
        })
    }

    /// A policy that never retries
    pub const fn no_retries() -> Self {
        Self {
            max_retries: 0,
            min_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(1),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, ApiError> {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.min_retry_delay_ms),
            Duration::from_millis(config.max_retry_delay_ms),
        )
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub const fn min_retry_delay(&self) -> Duration {
        self.min_retry_delay
    }

    pub const fn max_retry_delay(&self) -> Duration {
        self.max_retry_delay
    }

    /// Total attempts a call may make
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `attempt` (1-indexed). Attempt 0 is the first
    /// request and has no delay.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 2_u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
        self.min_retry_delay
            .checked_mul(factor)
            .unwrap_or(self.max_retry_delay)
            .min(self.max_retry_delay)
    }
}

impl Default for RetryPolicy {
    /// Three retries between 1 and 30 seconds
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}
