//! Controller types

use crate::config::ListConfig;
use crate::fetch::PageFetcher;
use crate::pagination::FetchError;
use crate::types::FilterMap;
use std::sync::Arc;

/// Why a call did not dispatch a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A fetch for the list is already in flight
    InFlight,
    /// Every item the server reported is loaded
    Exhausted,
    /// The new criteria equal the current ones
    Unchanged,
}

/// Result of a controller call that may fetch
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A page was fetched and applied
    Loaded {
        /// Page index that was applied
        page: u32,
        /// Number of items appended
        appended: usize,
    },
    /// The fetch failed; the descriptor is also stored on the list
    Failed(FetchError),
    /// Nothing was dispatched
    Skipped(SkipReason),
    /// The fetch completed after its session ended and was dropped
    Discarded,
}

impl LoadOutcome {
    /// Check if a page was applied
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Check if the fetch failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Check if nothing was dispatched
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Check if the result was dropped as stale
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

/// Per-list settings applied with
/// [`PaginationController::configure`](super::PaginationController::configure)
pub struct ListOptions<T: Send + 'static> {
    pub(crate) page_size: Option<u32>,
    pub(crate) search: Option<String>,
    pub(crate) filters: FilterMap,
    pub(crate) fetcher: Option<Arc<dyn PageFetcher<T>>>,
}

impl<T: Send + 'static> Default for ListOptions<T> {
    fn default() -> Self {
        Self {
            page_size: None,
            search: None,
            filters: FilterMap::new(),
            fetcher: None,
        }
    }
}

impl<T: Send + 'static> ListOptions<T> {
    /// Create empty options (controller defaults apply)
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from config-file settings
    pub fn from_config(config: &ListConfig) -> Self {
        Self {
            page_size: config.page_size,
            search: config.search.clone(),
            filters: config.filters.clone(),
            fetcher: None,
        }
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the initial search term
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Replace the initial filters
    #[must_use]
    pub fn filters(mut self, filters: FilterMap) -> Self {
        self.filters = filters;
        self
    }

    /// Add one initial filter
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Use a dedicated fetcher for this list
    #[must_use]
    pub fn fetcher(mut self, fetcher: impl PageFetcher<T> + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Use a shared fetcher for this list
    #[must_use]
    pub fn shared_fetcher(mut self, fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }
}

impl<T: Send + 'static> std::fmt::Debug for ListOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListOptions")
            .field("page_size", &self.page_size)
            .field("search", &self.search)
            .field("filters", &self.filters)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}
