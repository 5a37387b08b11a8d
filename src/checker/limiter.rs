// src/checker/limiter.rs
// =============================================================================
// A single token bucket shared by every worker.
//
// Each HTTP request (HEAD, GET fallback, every redirect hop) takes one token.
// Tokens refill continuously at `rate` per second up to `capacity`. A worker
// that finds the bucket empty sleeps exactly until the next token is due and
// tries again; nobody is ever dropped, they just wait their turn. A single
// sleep never exceeds MAX_WAIT, so very slow rates re-check periodically.
// =============================================================================

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const MAX_WAIT: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    /// None means unlimited.
    rate: Option<f64>,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// `rate` is requests per second across all callers; zero or less
    /// disables limiting. `burst` is how many tokens may pile up.
    pub fn new(rate: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            rate: (rate > 0.0 && rate.is_finite()).then_some(rate),
            capacity,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available and takes it.
    pub async fn acquire(&self) {
        let Some(rate) = self.rate else {
            return;
        };

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.last_refill = now;
                bucket.tokens = (bucket.tokens + elapsed * rate).min(self.capacity);

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                let secs = (1.0 - bucket.tokens) / rate;
                Duration::try_from_secs_f64(secs).map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT))
            };
            // The lock is released before sleeping so other workers can
            // compute their own wait.
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unlimited_never_waits() {
        let limiter = RateLimiter::new(0.0, 1);
        let started = Instant::now();
        for _ in 0..1_000 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_is_enforced() {
        let limiter = RateLimiter::new(10.0, 1);
        let started = Instant::now();
        // The first token is available immediately, the next ten take ~1s.
        for _ in 0..11 {
            limiter.acquire().await;
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(990), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1_200), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_available_up_front() {
        let limiter = RateLimiter::new(1.0, 5);
        let started = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiny_rate_waits_without_overflow() {
        let limiter = RateLimiter::new(1e-20, 1);
        limiter.acquire().await;

        // The next token is ~1e20 seconds away, beyond what Duration holds.
        let second = tokio::time::timeout(Duration::from_secs(5), limiter.acquire()).await;
        assert!(second.is_err());
    }
}
