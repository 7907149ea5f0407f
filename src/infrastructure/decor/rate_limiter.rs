use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter for decoration service requests
///
/// Holds up to `burst_size` tokens and refills `requests_per_second` tokens per
/// second. Every request consumes one token.
#[derive(Clone)]
pub struct TokenBucketRateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    capacity: f64,
    refill_rate: f64,
}

impl TokenBucketRateLimiter {
    /// Create a new rate limiter with a full bucket
    ///
    /// Non-positive inputs are clamped so the limiter always makes progress.
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        let refill_rate = requests_per_second.max(f64::EPSILON);
        let capacity = f64::from(burst_size.max(1));

        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            })),
            capacity,
            refill_rate,
        }
    }

    /// Acquire a token from the bucket, waiting if necessary
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;

                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                let tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.capacity);

                if tokens >= 1.0 {
                    bucket.tokens = tokens - 1.0;
                    bucket.last_refill = now;
                    return;
                }

                Duration::from_secs_f64(((1.0 - tokens) / self.refill_rate).max(0.01))
            };

            sleep(wait).await;
        }
    }

    /// Current number of available tokens (for testing/monitoring)
    pub async fn available_tokens(&self) -> f64 {
        let bucket = self.bucket.lock().await;
        let elapsed = Instant::now()
            .duration_since(bucket.last_refill)
            .as_secs_f64();
        (bucket.tokens + elapsed * self.refill_rate).min(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_allows_burst() {
        let rate_limiter = TokenBucketRateLimiter::new(1.0, 3);
        let start = Instant::now();

        for _ in 0..3 {
            rate_limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(rate_limiter.available_tokens().await < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_enforces_delay() {
        let rate_limiter = TokenBucketRateLimiter::new(2.0, 2);

        rate_limiter.acquire().await;
        rate_limiter.acquire().await;

        let start = Instant::now();
        rate_limiter.acquire().await;

        assert!(
            start.elapsed() >= Duration::from_millis(490),
            "Expected delay ~500ms, got {:?}",
            start.elapsed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_respects_capacity() {
        let rate_limiter = TokenBucketRateLimiter::new(5.0, 5);

        sleep(Duration::from_secs(10)).await;

        let tokens = rate_limiter.available_tokens().await;
        assert!(tokens <= 5.0, "Tokens ({tokens}) exceeded capacity (5.0)");
    }
}
