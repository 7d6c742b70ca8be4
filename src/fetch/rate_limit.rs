//! Rate limiting for fetchers
//!
//! Uses the governor crate for token bucket rate limiting. Useful when many
//! lists share one backend and the host wants a global request budget.

use super::fetcher::PageFetcher;
use crate::error::Result;
use crate::pagination::{PageRequest, PageResult};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum number of fetches per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

fn default_burst_size() -> u32 {
    1
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    ///
    /// Zero values are treated as 1; config validation rejects them earlier.
    pub fn new(config: &RateLimiterConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a fetch can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

/// Waits for a rate limiter permit before every fetch
#[derive(Debug, Clone)]
pub struct RateLimitedFetcher<F> {
    inner: F,
    limiter: RateLimiter,
}

impl<F> RateLimitedFetcher<F> {
    /// Wrap `inner` with a limiter built from `config`
    pub fn new(inner: F, config: &RateLimiterConfig) -> Self {
        Self::with_limiter(inner, RateLimiter::new(config))
    }

    /// Wrap `inner` with an existing (possibly shared) limiter
    pub fn with_limiter(inner: F, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<T, F> PageFetcher<T> for RateLimitedFetcher<F>
where
    T: Send + 'static,
    F: PageFetcher<T>,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>> {
        self.limiter.wait().await;
        self.inner.fetch_page(request).await
    }
}
