//! In-memory fetcher
//!
//! Pages over a local collection. Search and filters are evaluated against
//! each item's JSON form, so any `Serialize` type works without extra glue.

use super::fetcher::PageFetcher;
use crate::error::{Error, Result};
use crate::pagination::{PageRequest, PageResult};
use crate::types::{extract_path_value, FilterMap, JsonValue};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Fetcher serving pages from an in-memory collection
#[derive(Debug)]
pub struct MemoryFetcher<T> {
    items: Arc<RwLock<Vec<T>>>,
    /// Paths searched for the term; empty means every string field
    search_fields: Vec<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl<T> MemoryFetcher<T> {
    /// Create a fetcher over the given items
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            search_fields: Vec::new(),
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Restrict search to the given field paths
    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Delay every answer by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Append an item to the backing collection
    pub async fn push(&self, item: T) {
        self.items.write().await.push(item);
    }

    /// Remove every item from the backing collection
    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    /// Number of items in the backing collection
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Check if the backing collection is empty
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> PageFetcher<T> for MemoryFetcher<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let needle = request
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty());

        let items = self.items.read().await;
        let mut matching = Vec::new();
        for item in items.iter() {
            let doc = serde_json::to_value(item)
                .map_err(|e| Error::decode(format!("Failed to serialize item: {e}")))?;

            if !matches_filters(&doc, &request.filters) {
                continue;
            }
            if let Some(needle) = &needle {
                if !matches_search(&doc, needle, &self.search_fields) {
                    continue;
                }
            }
            matching.push(item.clone());
        }

        let total = matching.len() as u64;
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let page_items = matching
            .into_iter()
            .skip(start)
            .take(request.page_size as usize)
            .collect();

        Ok(PageResult::for_request(page_items, total, request))
    }
}

/// Check every filter against the item; a missing field never matches
fn matches_filters(doc: &JsonValue, filters: &FilterMap) -> bool {
    filters
        .iter()
        .all(|(path, expected)| extract_path_value(doc, path) == Some(expected))
}

/// Case-insensitive substring search over the chosen fields
fn matches_search(doc: &JsonValue, needle: &str, fields: &[String]) -> bool {
    if fields.is_empty() {
        return contains_text(doc, needle);
    }
    fields
        .iter()
        .filter_map(|path| extract_path_value(doc, path))
        .any(|value| contains_text(value, needle))
}

fn contains_text(value: &JsonValue, needle: &str) -> bool {
    match value {
        JsonValue::String(s) => s.to_lowercase().contains(needle),
        JsonValue::Array(values) => values.iter().any(|v| contains_text(v, needle)),
        JsonValue::Object(map) => map.values().any(|v| contains_text(v, needle)),
        _ => false,
    }
}
