//! Configuration types
//!
//! Controller-wide defaults and per-list settings, loadable from YAML or JSON.

use crate::error::{Error, Result};
use crate::fetch::RateLimiterConfig;
use crate::types::FilterMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Page size used when neither the list nor the controller sets one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// Controller Config
// ============================================================================

/// Complete controller configuration
///
/// ```yaml
/// default_page_size: 20
/// fetch_timeout_ms: 10000
/// rate_limit:
///   requests_per_second: 5
///   burst_size: 5
/// lists:
///   breed_logs:
///     page_size: 50
///   documents:
///     filters:
///       status: published
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Page size for lists without their own
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Per-fetch timeout in milliseconds
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    /// Shared rate limit applied to every fetch
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Per-list settings keyed by list key
    #[serde(default)]
    pub lists: HashMap<String, ListConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            fetch_timeout_ms: None,
            rate_limit: None,
            lists: HashMap::new(),
        }
    }
}

impl ControllerConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default page size
    #[must_use]
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Set the fetch timeout
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the shared rate limit
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimiterConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Add settings for one list
    #[must_use]
    pub fn with_list(mut self, key: impl Into<String>, list: ListConfig) -> Self {
        self.lists.insert(key.into(), list);
        self
    }

    /// Fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Settings for a list, if configured
    pub fn list(&self, key: &str) -> Option<&ListConfig> {
        self.lists.get(key)
    }

    /// Effective page size for a list
    pub fn page_size_for(&self, key: &str) -> u32 {
        self.list(key)
            .and_then(|list| list.page_size)
            .unwrap_or(self.default_page_size)
    }

    /// Validate all values
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(Error::invalid_value(
                "default_page_size",
                "must be greater than 0",
            ));
        }

        if self.fetch_timeout_ms == Some(0) {
            return Err(Error::invalid_value(
                "fetch_timeout_ms",
                "must be greater than 0",
            ));
        }

        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "rate_limit.requests_per_second",
                    "must be greater than 0",
                ));
            }
            if rate_limit.burst_size == 0 {
                return Err(Error::invalid_value(
                    "rate_limit.burst_size",
                    "must be greater than 0",
                ));
            }
        }

        for (key, list) in &self.lists {
            if key.is_empty() {
                return Err(Error::config("List key cannot be empty"));
            }
            if list.page_size == Some(0) {
                return Err(Error::invalid_value(
                    format!("lists.{key}.page_size"),
                    "must be greater than 0",
                ));
            }
        }

        Ok(())
    }
}

// ============================================================================
// List Config
// ============================================================================

/// Settings for one keyed list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Page size override
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Initial search term
    #[serde(default)]
    pub search: Option<String>,

    /// Initial filters
    #[serde(default)]
    pub filters: FilterMap,
}

impl ListConfig {
    /// Create empty list settings
    pub fn new() -> Self {
        Self::default()
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

    /// Add an initial filter
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}
