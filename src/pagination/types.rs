//! Page request and result types
//!
//! Defines the values exchanged between the controller and a fetcher.

use crate::types::{value_to_string, FilterMap, StringMap};
use serde::{Deserialize, Serialize};

/// A request for one page of a list
///
/// Built fresh by the controller for every fetch and handed to the
/// [`PageFetcher`](crate::fetch::PageFetcher) by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
    /// Free-text search term, if any
    #[serde(default)]
    pub search: Option<String>,
    /// Field filters
    #[serde(default)]
    pub filters: FilterMap,
}

impl PageRequest {
    /// Create a request without search or filters
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            search: None,
            filters: FilterMap::new(),
        }
    }

    /// Set the search term
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    /// Set the filters
    #[must_use]
    pub fn with_filters(mut self, filters: FilterMap) -> Self {
        self.filters = filters;
        self
    }

    /// Index of the first item of this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Check if this is the first page
    pub fn is_first_page(&self) -> bool {
        self.page == 0
    }

    /// Render the request as flat query parameters
    ///
    /// Produces `page`, `page_size`, `search` (when set) and one entry per
    /// filter. Hosts talking to a query-string backend can pass these through
    /// directly.
    pub fn to_query_params(&self) -> StringMap {
        let mut params = StringMap::new();
        params.insert("page".to_string(), self.page.to_string());
        params.insert("page_size".to_string(), self.page_size.to_string());
        if let Some(search) = &self.search {
            params.insert("search".to_string(), search.clone());
        }
        for (field, value) in &self.filters {
            params.insert(field.clone(), value_to_string(value));
        }
        params
    }
}

/// One page of results returned by a fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Total number of items matching the request criteria
    pub total_count: u64,
    /// Page index this result belongs to
    pub page: u32,
    /// Page size the server applied
    pub page_size: u32,
}

impl<T> PageResult<T> {
    /// Create a page result
    pub fn new(items: Vec<T>, total_count: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            page,
            page_size,
        }
    }

    /// Create a page result answering the given request
    pub fn for_request(items: Vec<T>, total_count: u64, request: &PageRequest) -> Self {
        Self::new(items, total_count, request.page, request.page_size)
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if this page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of pages implied by `total_count`
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    /// Check if no page follows this one
    pub fn is_last_page(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages()
    }

    /// Convert the items, keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
