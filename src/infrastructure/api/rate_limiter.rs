use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Errors returned while waiting for a token
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    /// The caller cancelled before a token became available
    #[error("wait for a rate limit token was cancelled")]
    Cancelled,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter for API request throttling
///
/// One limiter is shared by every request a client issues, including retries.
/// Refill and consumption happen inside a single critical section, so two
/// concurrent waiters can never be granted the same token. The lock is
/// released before sleeping.
#[derive(Debug)]
pub struct TokenBucketRateLimiter {
    state: Mutex<BucketState>,
    /// Maximum token capacity (burst)
    capacity: f64,
    /// Tokens added per second
    refill_rate: f64,
}

impl TokenBucketRateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `requests_per_second` - steady-state rate; non-finite or non-positive
    ///   values fall back to 1.0
    /// * `burst` - bucket capacity; at least 1
    ///
    /// # Example
    /// ```
    /// use cloudflare_api::infrastructure::api::TokenBucketRateLimiter;
    ///
    /// // Four requests per second, no burst: the provider's default limit
    /// let rate_limiter = TokenBucketRateLimiter::new(4.0, 1);
    /// assert_eq!(rate_limiter.capacity(), 1.0);
    /// ```
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        let refill_rate = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            requests_per_second
        } else {
            1.0
        };
        let capacity = f64::from(burst.max(1));

        Self {
            // Start with full capacity
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_rate,
        }
    }

    /// Bucket capacity
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Tokens added per second
    pub const fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Acquire a token from the bucket, waiting if necessary
    ///
    /// Returns [`RateLimitError::Cancelled`] as soon as `cancel` fires, whether
    /// before the first check or in the middle of a wait.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), RateLimitError> {
        loop {
            if cancel.is_cancelled() {
                return Err(RateLimitError::Cancelled);
            }

            let wait_duration = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let tokens = self.refilled(&state, now);

                if tokens >= 1.0 {
                    state.tokens = tokens - 1.0;
                    state.last_refill = now;
                    return Ok(());
                }

                state.tokens = tokens;
                state.last_refill = now;

                let tokens_needed = 1.0 - tokens;
                Duration::from_secs_f64((tokens_needed / self.refill_rate).max(0.001))
            };

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(RateLimitError::Cancelled),
                () = sleep(wait_duration) => {}
            }
        }
    }

    /// Take a token only if one is available right now
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let tokens = self.refilled(&state, now);
        state.last_refill = now;

        if tokens >= 1.0 {
            state.tokens = tokens - 1.0;
            true
        } else {
            state.tokens = tokens;
            false
        }
    }

    /// Get the current number of available tokens (for monitoring)
    pub async fn available_tokens(&self) -> f64 {
        let state = self.state.lock().await;
        self.refilled(&state, Instant::now())
    }

    fn refilled(&self, state: &BucketState, now: Instant) -> f64 {
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        (state.tokens + elapsed * self.refill_rate).min(self.capacity)
    }
}

impl Default for TokenBucketRateLimiter {
    /// 4 requests per second with no burst (1200 requests per 5 minutes)
    fn default() -> Self {
        Self::new(4.0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rate_limiter_allows_initial_burst() {
        let rate_limiter = TokenBucketRateLimiter::new(10.0, 3);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        for _ in 0..3 {
            rate_limiter.acquire(&cancel).await.unwrap();
        }

        assert!(start.elapsed() < Duration::from_millis(50));
        assert!(rate_limiter.available_tokens().await < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_enforces_delay() {
        let rate_limiter = TokenBucketRateLimiter::new(2.0, 1);
        let cancel = CancellationToken::new();

        rate_limiter.acquire(&cancel).await.unwrap();

        let start = Instant::now();
        rate_limiter.acquire(&cancel).await.unwrap();
        let elapsed = start.elapsed();

        // One token every 500ms
        assert!(
            elapsed >= Duration::from_millis(490),
            "Expected delay >= 490ms, got {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_refills_over_time() {
        let rate_limiter = TokenBucketRateLimiter::new(10.0, 10);
        let cancel = CancellationToken::new();

        for _ in 0..10 {
            rate_limiter.acquire(&cancel).await.unwrap();
        }
        assert!(rate_limiter.available_tokens().await < 1.0);

        sleep(Duration::from_millis(500)).await;

        let tokens_after = rate_limiter.available_tokens().await;
        assert!(
            (4.5..=5.5).contains(&tokens_after),
            "Expected ~5 tokens, got {tokens_after}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_never_exceeds_capacity() {
        let rate_limiter = TokenBucketRateLimiter::new(100.0, 2);
        sleep(Duration::from_secs(10)).await;
        assert!((rate_limiter.available_tokens().await - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_try_acquire() {
        let rate_limiter = TokenBucketRateLimiter::new(0.5, 1);
        assert!(rate_limiter.try_acquire().await);
        assert!(!rate_limiter.try_acquire().await);
    }

    #[tokio::test]
    async fn test_acquire_on_cancelled_token_fails_immediately() {
        let rate_limiter = TokenBucketRateLimiter::new(1.0, 1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            rate_limiter.acquire(&cancel).await,
            Err(RateLimitError::Cancelled)
        );
        // The token was not consumed
        assert!(rate_limiter.try_acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_wait() {
        let rate_limiter = Arc::new(TokenBucketRateLimiter::new(0.01, 1));
        let cancel = CancellationToken::new();
        rate_limiter.acquire(&cancel).await.unwrap();

        let waiter = {
            let rate_limiter = Arc::clone(&rate_limiter);
            let cancel = cancel.clone();
            tokio::spawn(async move { rate_limiter.acquire(&cancel).await })
        };

        sleep(Duration::from_millis(100)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();

        assert_eq!(waiter.await.unwrap(), Err(RateLimitError::Cancelled));
        // Next token would have taken 100s
        assert!(cancelled_at.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_parameters_are_normalized() {
        let rate_limiter = TokenBucketRateLimiter::new(f64::NAN, 0);
        assert!((rate_limiter.refill_rate() - 1.0).abs() < f64::EPSILON);
        assert!((rate_limiter.capacity() - 1.0).abs() < f64::EPSILON);

        let rate_limiter = TokenBucketRateLimiter::new(-3.0, 5);
        assert!((rate_limiter.refill_rate() - 1.0).abs() < f64::EPSILON);
        assert!((rate_limiter.capacity() - 5.0).abs() < f64::EPSILON);
    }
}
