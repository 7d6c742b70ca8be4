//! Per-list state
//!
//! `ListState` is what observers render. The controller owns the only
//! mutable copy of each; everything handed out is a snapshot.

use super::types::PageResult;
use crate::error::Error;
use crate::types::FilterMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse load status of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// No fetch in flight
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
}

/// Descriptor of the last failed fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchError {
    /// Human-readable failure message
    pub message: String,
    /// Whether retrying the same request may succeed
    pub retryable: bool,
    /// When the failure was recorded
    pub occurred_at: DateTime<Utc>,
}

impl FetchError {
    /// Create a descriptor stamped with the current time
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            retryable,
            occurred_at: Utc::now(),
        }
    }
}

impl From<&Error> for FetchError {
    fn from(err: &Error) -> Self {
        Self::new(err.to_string(), err.is_retryable())
    }
}

impl From<Error> for FetchError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

/// Paged-list state for one key
///
/// `current_page` and `total_count` are `None` until the first page of the
/// current session lands. Items never exceed a known `total_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListState<T> {
    /// Items accumulated across pages, in fetch order
    pub items: Vec<T>,
    /// Last successfully fetched page
    pub current_page: Option<u32>,
    /// Latest total reported by the server
    pub total_count: Option<u64>,
    /// True while a fetch is in flight
    pub is_loading: bool,
    /// Last fetch failure, cleared by the next success or a reset
    pub error: Option<FetchError>,
    /// Search term in effect
    pub search: Option<String>,
    /// Filters in effect
    pub filters: FilterMap,
    /// When the last page was applied
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: None,
            total_count: None,
            is_loading: false,
            error: None,
            search: None,
            filters: FilterMap::new(),
            last_loaded_at: None,
        }
    }
}

impl<T> ListState<T> {
    /// Create the initial (empty) state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state with the given criteria
    pub fn with_criteria(search: Option<String>, filters: FilterMap) -> Self {
        Self {
            search,
            filters,
            ..Self::default()
        }
    }

    /// Number of loaded items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no items are loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the page a load would request next
    pub fn next_page(&self) -> u32 {
        self.current_page.map_or(0, |page| page + 1)
    }

    /// Check if every item the server reported has been loaded
    pub fn is_exhausted(&self) -> bool {
        self.total_count
            .is_some_and(|total| self.items.len() as u64 >= total)
    }

    /// Check if another page may exist
    pub fn has_more(&self) -> bool {
        !self.is_exhausted()
    }

    /// Check if the last fetch failed
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Current load status
    pub fn status(&self) -> LoadStatus {
        if self.is_loading {
            LoadStatus::Loading
        } else {
            LoadStatus::Idle
        }
    }

    // ------------------------------------------------------------------------
    // Transitions (controller only)
    // ------------------------------------------------------------------------

    pub(crate) fn begin_load(&mut self) {
        self.is_loading = true;
    }

    /// Drop loaded pages but keep criteria and error
    pub(crate) fn clear_pages(&mut self) {
        self.items.clear();
        self.current_page = None;
        self.total_count = None;
        self.last_loaded_at = None;
    }

    /// Append a fetched page. Returns the number of items appended.
    pub(crate) fn apply_page(&mut self, page: u32, result: PageResult<T>) -> usize {
        let appended = result.items.len();
        let reported_total = result.total_count;

        self.items.extend(result.items);
        self.current_page = Some(page);

        let loaded = self.items.len() as u64;
        let total = if appended == 0 {
            // An empty page ends the session even if the server claims more.
            if reported_total > loaded {
                tracing::warn!(
                    page,
                    reported_total,
                    loaded,
                    "Empty page before reported total, marking list exhausted"
                );
            }
            loaded
        } else if reported_total < loaded {
            tracing::warn!(
                page,
                reported_total,
                loaded,
                "Server total is below loaded item count, raising total"
            );
            loaded
        } else {
            reported_total
        };

        self.total_count = Some(total);
        self.is_loading = false;
        self.error = None;
        self.last_loaded_at = Some(Utc::now());
        appended
    }

    pub(crate) fn apply_failure(&mut self, error: FetchError) {
        self.is_loading = false;
        self.error = Some(error);
    }
}
