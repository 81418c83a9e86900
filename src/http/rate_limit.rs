//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket rate limiting. Quotas are
//! expressed as "N requests per window", matching how servers advertise
//! their limits (Mastodon: 300 requests per 5 minutes per account).

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Requests allowed per window
    pub requests: u32,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Burst size (max tokens in bucket); defaults to `requests`
    #[serde(default)]
    pub burst: Option<u32>,
}

fn default_window_secs() -> u64 {
    1
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::mastodon()
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests: u32, window: Duration) -> Self {
        Self {
            requests,
            window_secs: window.as_secs().max(1),
            burst: None,
        }
    }

    /// Create a per-second limit
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// Default Mastodon API limit (300 requests per 5 minutes)
    pub fn mastodon() -> Self {
        Self::new(300, Duration::from_secs(300))
    }

    /// Set burst size
    #[must_use]
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    /// Interval between replenished tokens
    pub fn replenish_interval(&self) -> Duration {
        let requests = self.requests.max(1);
        Duration::from_secs(self.window_secs.max(1)) / requests
    }

    fn quota(&self) -> Quota {
        let one = NonZeroU32::MIN;
        let burst = NonZeroU32::new(self.burst.unwrap_or(self.requests)).unwrap_or(one);
        Quota::with_period(self.replenish_interval())
            .unwrap_or_else(|| Quota::per_second(one))
            .allow_burst(burst)
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}
