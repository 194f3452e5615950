//! Per-host request throttling.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Enforces a minimum delay between requests to the same host, so fetching
/// twenty candidate images from one CDN doesn't hammer it.
pub struct RateLimiter {
    min_delay: Duration,
    last_request: DashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: DashMap::new(),
        }
    }

    /// Sleep if the previous request to `host` was less than `min_delay` ago,
    /// then record this request.
    pub async fn wait(&self, host: &str) {
        if self.min_delay.is_zero() {
            return;
        }

        // Copy the timestamp out so the map guard is not held across the
        // sleep; concurrent waits for the same host must not block on the
        // shard lock for the whole delay.
        let last = self.last_request.get(host).map(|entry| *entry);

        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }

        self.last_request.insert(host.to_string(), Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
