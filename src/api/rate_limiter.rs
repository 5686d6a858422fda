//! Request pacing for the ranking services.
//!
//! Both services throttle aggressive clients, so every request goes
//! through a limiter that enforces a minimum interval between requests
//! plus a per-minute cap. Tests configure effectively infinite rates
//! to run without delays.

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between consecutive requests
    min_interval: Duration,
    /// Maximum requests in any rolling minute
    max_per_minute: u32,
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps in the last minute
    recent_requests: Vec<Instant>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_second` spacing and at
    /// most `requests_per_minute` requests per rolling minute. A
    /// non-finite or non-positive rate disables the spacing constraint.
    pub fn new(requests_per_second: f64, requests_per_minute: u32) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            min_interval,
            max_per_minute: requests_per_minute,
            last_request: None,
            recent_requests: Vec::new(),
        }
    }

    /// Wait until the next request is allowed, then record it.
    pub async fn acquire(&mut self) {
        let now = Instant::now();

        // Drop timestamps older than the rolling minute
        self.recent_requests
            .retain(|&timestamp| now.duration_since(timestamp) < Duration::from_secs(60));

        if self.recent_requests.len() >= self.max_per_minute as usize {
            if let Some(&oldest) = self.recent_requests.first() {
                let elapsed = now.duration_since(oldest);
                if elapsed < Duration::from_secs(60) {
                    let wait = Duration::from_secs(60) - elapsed;
                    tracing::debug!(
                        wait_ms = wait.as_millis(),
                        "Rate limit: waiting for per-minute limit"
                    );
                    sleep(wait).await;
                }
            }
        }

        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait.as_millis(),
                    "Rate limit: waiting for request spacing"
                );
                sleep(wait).await;
            }
        }

        let stamp = Instant::now();
        self.last_request = Some(stamp);
        self.recent_requests.push(stamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_spacing() {
        let mut limiter = RateLimiter::new(4.0, 1000);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }

        // Three requests at 4/s need at least two 250ms gaps
        assert!(start.elapsed() >= Duration::from_millis(450));
    }

    #[tokio::test]
    async fn test_unlimited_rate_does_not_wait() {
        let mut limiter = RateLimiter::new(f64::INFINITY, u32::MAX);

        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_per_minute_limit_delays() {
        let mut limiter = RateLimiter::new(f64::INFINITY, 3);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        // First three are immediate
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_zero_rate_disables_spacing() {
        let limiter = RateLimiter::new(0.0, 10);
        assert_eq!(limiter.min_interval, Duration::ZERO);
    }
}
