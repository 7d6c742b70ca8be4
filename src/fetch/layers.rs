//! Fetcher layers
//!
//! Wrappers that add cross-cutting behavior around any fetcher.

use super::fetcher::PageFetcher;
use crate::error::{Error, Result};
use crate::pagination::{PageRequest, PageResult};
use async_trait::async_trait;
use std::time::Duration;

/// Fails a fetch that takes longer than a fixed timeout
///
/// The inner future is dropped on expiry; its result never reaches the
/// controller.
#[derive(Debug, Clone)]
pub struct TimeoutFetcher<F> {
    inner: F,
    timeout: Duration,
}

impl<F> TimeoutFetcher<F> {
    /// Wrap `inner` with the given timeout
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<T, F> PageFetcher<T> for TimeoutFetcher<F>
where
    T: Send + 'static,
    F: PageFetcher<T>,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>> {
        match tokio::time::timeout(self.timeout, self.inner.fetch_page(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    page = request.page,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Page fetch timed out"
                );
                Err(Error::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}
