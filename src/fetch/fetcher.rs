//! Fetch capability trait and closure adapter

use crate::error::Result;
use crate::pagination::{PageRequest, PageResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Capability that retrieves one page of a list
///
/// Implemented by the host for whatever backend it talks to. The controller
/// never retries; a failed fetch is recorded on the list and left to the
/// caller.
///
/// The recorded [`FetchError::retryable`](crate::FetchError) flag comes from
/// [`Error::is_retryable`](crate::Error::is_retryable). Report transport
/// failures as [`Error::fetch`](crate::Error::fetch) or
/// [`Error::http_status`](crate::Error::http_status); an `anyhow::Error`
/// passed through `?` is treated as permanent.
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync {
    /// Fetch the page described by `request`
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>>;
}

#[async_trait]
impl<T, P> PageFetcher<T> for Arc<P>
where
    T: Send + 'static,
    P: PageFetcher<T> + ?Sized,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>> {
        (**self).fetch_page(request).await
    }
}

/// Fetcher backed by an async closure
///
/// ```rust,ignore
/// let fetcher = FnFetcher::new(|request: PageRequest| async move {
///     let rows = api.list_documents(request.offset(), request.page_size).await?;
///     Ok(PageResult::for_request(rows.items, rows.total, &request))
/// });
/// ```
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    /// Wrap a closure taking an owned `PageRequest`
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult<T>>> + Send,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>> {
        (self.f)(request.clone()).await
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish()
    }
}
