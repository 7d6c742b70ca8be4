//! Pagination controller implementation
//!
//! One `ListState` per key behind a single lock. The lock is held only to
//! read or apply state, never across a fetch. Each fetch carries the
//! session id that was current when it was dispatched; a result whose
//! session has since ended is dropped.
//!
//! The fetch and the apply run on their own task. A caller that stops
//! waiting (timeout, `select!`, aborted task) does not strand the list in
//! `Loading`; the result still lands or is discarded as usual.

use super::types::{ListOptions, LoadOutcome, SkipReason};
use crate::config::ControllerConfig;
use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, RateLimitedFetcher, RateLimiter, TimeoutFetcher};
use crate::pagination::{FetchError, ListState, PageRequest};
use crate::types::FilterMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

type SharedFetcher<T> = Arc<dyn PageFetcher<T>>;

/// State and settings for one keyed list
struct ListEntry<T: Send + 'static> {
    state: ListState<T>,
    /// Session the state belongs to
    session: u64,
    page_size: u32,
    /// Criteria restored by `reset`
    initial_search: Option<String>,
    initial_filters: FilterMap,
    fetcher: Option<SharedFetcher<T>>,
    sender: watch::Sender<ListState<T>>,
}

impl<T: Clone + Send + 'static> ListEntry<T> {
    fn publish(&self) {
        self.sender.send_replace(self.state.clone());
    }
}

/// A dispatched fetch waiting for its result
struct Ticket<T: Send + 'static> {
    key: String,
    session: u64,
    request: PageRequest,
    fetcher: SharedFetcher<T>,
}

struct Inner<T: Send + 'static> {
    config: ControllerConfig,
    default_fetcher: Option<SharedFetcher<T>>,
    rate_limiter: Option<RateLimiter>,
    lists: RwLock<HashMap<String, ListEntry<T>>>,
    sessions: AtomicU64,
}

/// Key-scoped pagination controller
///
/// Owns the paged state of any number of lists, each identified by a string
/// key. At most one fetch per key is in flight; results from a superseded
/// session are dropped. Cloning is cheap and clones share state.
///
/// ```rust,ignore
/// let controller = PaginationController::new(MemoryFetcher::new(documents));
///
/// controller.load_next_page("documents").await?;
/// controller.set_search("documents", "invoice").await?;
///
/// let state = controller.get_state("documents").await;
/// render(&state.items, state.is_loading, state.error.as_ref());
/// ```
pub struct PaginationController<T: Send + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T> PaginationController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a controller with default settings and one fetcher for every list
    pub fn new(fetcher: impl PageFetcher<T> + 'static) -> Self {
        Self::build(ControllerConfig::default(), Some(Arc::new(fetcher)))
    }

    /// Create a controller from a config and a default fetcher
    pub fn with_config(
        config: ControllerConfig,
        fetcher: impl PageFetcher<T> + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, Some(Arc::new(fetcher))))
    }

    /// Create a controller without a default fetcher
    ///
    /// Every list must get its own fetcher through [`configure`](Self::configure)
    /// before it can load.
    pub fn from_config(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, None))
    }

    fn build(config: ControllerConfig, default_fetcher: Option<SharedFetcher<T>>) -> Self {
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);
        let mut inner = Inner {
            config,
            default_fetcher: None,
            rate_limiter,
            lists: RwLock::new(HashMap::new()),
            sessions: AtomicU64::new(0),
        };
        inner.default_fetcher = default_fetcher.map(|f| inner.layered(f));

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Controller configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Apply per-list settings
    ///
    /// Starts a new session for the list: loaded pages are dropped and any
    /// in-flight fetch is discarded when it completes.
    pub async fn configure(&self, key: &str, options: ListOptions<T>) -> Result<()> {
        if options.page_size == Some(0) {
            return Err(Error::usage(key, "page_size must be greater than 0"));
        }

        let fetcher = options.fetcher.map(|f| self.inner.layered(f));
        let page_size = options
            .page_size
            .unwrap_or_else(|| self.inner.config.page_size_for(key));

        let mut lists = self.inner.lists.write().await;
        let entry = self.inner.entry(&mut lists, key);

        let session = self.inner.next_session();
        entry.session = session;
        entry.page_size = page_size;
        entry.fetcher = fetcher;
        entry.initial_search = normalize_search(options.search.as_deref());
        entry.initial_filters = options.filters;
        entry.state = ListState::with_criteria(
            entry.initial_search.clone(),
            entry.initial_filters.clone(),
        );
        entry.publish();

        debug!(key, page_size, session, "Configured list");
        Ok(())
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch the next page of a list
    ///
    /// Skips (without error) while a fetch is in flight or when the list is
    /// exhausted. A fetch failure is stored on the list and returned as
    /// [`LoadOutcome::Failed`]; only usage errors are returned as `Err`.
    pub async fn load_next_page(&self, key: &str) -> Result<LoadOutcome> {
        let ticket = {
            let mut lists = self.inner.lists.write().await;
            let entry = self.inner.entry(&mut lists, key);

            if entry.state.is_loading {
                debug!(key, "Fetch already in flight, skipping load");
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            if entry.state.is_exhausted() {
                debug!(key, loaded = entry.state.len(), "List exhausted, skipping load");
                return Ok(LoadOutcome::Skipped(SkipReason::Exhausted));
            }

            let fetcher = self.inner.resolve_fetcher(key, entry)?;
            dispatch(key, entry, fetcher)
        };

        self.settle(ticket).await
    }

    /// Drop loaded pages and fetch page 0 again
    ///
    /// Keeps the current search and filters. Skipped while a fetch is in
    /// flight.
    pub async fn refresh(&self, key: &str) -> Result<LoadOutcome> {
        let ticket = {
            let mut lists = self.inner.lists.write().await;
            let entry = self.inner.entry(&mut lists, key);

            if entry.state.is_loading {
                debug!(key, "Fetch already in flight, skipping refresh");
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }

            let fetcher = self.inner.resolve_fetcher(key, entry)?;
            entry.session = self.inner.next_session();
            entry.state.clear_pages();
            dispatch(key, entry, fetcher)
        };

        self.settle(ticket).await
    }

    /// Change the search term and reload from page 0
    ///
    /// Leading and trailing whitespace is ignored and a blank term clears the
    /// search. An unchanged term is a no-op. A changed term supersedes any
    /// fetch in flight.
    pub async fn set_search(&self, key: &str, term: &str) -> Result<LoadOutcome> {
        self.change_criteria(key, Criteria::Search(normalize_search(Some(term))))
            .await
    }

    /// Remove the search term and reload from page 0
    pub async fn clear_search(&self, key: &str) -> Result<LoadOutcome> {
        self.set_search(key, "").await
    }

    /// Change the filters and reload from page 0
    ///
    /// Unchanged filters are a no-op. Changed filters supersede any fetch in
    /// flight.
    pub async fn set_filters(&self, key: &str, filters: FilterMap) -> Result<LoadOutcome> {
        self.change_criteria(key, Criteria::Filters(filters)).await
    }

    async fn change_criteria(&self, key: &str, criteria: Criteria) -> Result<LoadOutcome> {
        let ticket = {
            let mut lists = self.inner.lists.write().await;
            let entry = self.inner.entry(&mut lists, key);

            if criteria.is_current(&entry.state) {
                return Ok(LoadOutcome::Skipped(SkipReason::Unchanged));
            }
            let fetcher = self.inner.resolve_fetcher(key, entry)?;
            criteria.apply(&mut entry.state);

            if entry.state.is_loading {
                debug!(key, superseded = entry.session, "Criteria changed mid-flight");
            }
            entry.session = self.inner.next_session();
            entry.state.clear_pages();
            dispatch(key, entry, fetcher)
        };

        self.settle(ticket).await
    }

    /// Run a dispatched fetch on its own task and wait for the outcome
    async fn settle(&self, ticket: Ticket<T>) -> Result<LoadOutcome> {
        let controller = self.clone();
        let key = ticket.key.clone();
        let handle = tokio::spawn(async move { controller.complete(ticket).await });

        match handle.await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                warn!(key = %key, error = %err, "Page fetch task cancelled");
                Err(Error::Other(format!("Page fetch for '{key}' was cancelled: {err}")))
            }
        }
    }

    /// Await a dispatched fetch and apply its result if still current
    async fn complete(&self, ticket: Ticket<T>) -> LoadOutcome {
        let result = ticket.fetcher.fetch_page(&ticket.request).await;
        let page = ticket.request.page;

        let mut lists = self.inner.lists.write().await;
        let Some(entry) = lists.get_mut(&ticket.key) else {
            debug!(key = %ticket.key, page, "List released before fetch completed, discarding");
            return LoadOutcome::Discarded;
        };

        if entry.session != ticket.session {
            debug!(
                key = %ticket.key,
                page,
                stale = ticket.session,
                current = entry.session,
                "Discarding stale page"
            );
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(result) => {
                if result.page != page {
                    warn!(
                        key = %ticket.key,
                        requested = page,
                        returned = result.page,
                        "Fetcher answered with a different page index"
                    );
                }
                let appended = entry.state.apply_page(page, result);
                entry.publish();
                debug!(
                    key = %ticket.key,
                    page,
                    appended,
                    loaded = entry.state.len(),
                    total = ?entry.state.total_count,
                    "Applied page"
                );
                LoadOutcome::Loaded { page, appended }
            }
            Err(err) => {
                warn!(key = %ticket.key, page, error = %err, "Page fetch failed");
                let error = FetchError::from(&err);
                entry.state.apply_failure(error.clone());
                entry.publish();
                LoadOutcome::Failed(error)
            }
        }
    }

    // ========================================================================
    // Reset / release
    // ========================================================================

    /// Return a list to its initial state without fetching
    ///
    /// Always allowed. Restores the list's configured criteria (none unless
    /// set through config or [`configure`](Self::configure)) and discards any
    /// fetch in flight.
    pub async fn reset(&self, key: &str) {
        let mut lists = self.inner.lists.write().await;
        if let Some(entry) = lists.get_mut(key) {
            let session = self.inner.next_session();
            entry.session = session;
            entry.state = ListState::with_criteria(
                entry.initial_search.clone(),
                entry.initial_filters.clone(),
            );
            entry.publish();
            debug!(key, session, "Reset list");
        }
    }

    /// Drop all state for a list
    ///
    /// Subscribers see their channel close. Returns false if the list held no
    /// state.
    pub async fn release(&self, key: &str) -> bool {
        let released = self.inner.lists.write().await.remove(key).is_some();
        if released {
            debug!(key, "Released list");
        }
        released
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Snapshot of a list's state
    ///
    /// Never fetches. A key without state reads as the initial state.
    pub async fn get_state(&self, key: &str) -> ListState<T> {
        let lists = self.inner.lists.read().await;
        match lists.get(key) {
            Some(entry) => entry.state.clone(),
            None => self.inner.initial_state(key),
        }
    }

    /// Subscribe to every state change of a list
    ///
    /// The receiver starts with the current state marked as seen.
    pub async fn subscribe(&self, key: &str) -> watch::Receiver<ListState<T>> {
        let mut lists = self.inner.lists.write().await;
        self.inner.entry(&mut lists, key).sender.subscribe()
    }

    /// Keys currently holding state, sorted
    pub async fn keys(&self) -> Vec<String> {
        let lists = self.inner.lists.read().await;
        let mut keys: Vec<String> = lists.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn next_session(&self) -> u64 {
        self.sessions.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wrap a fetcher with the configured rate limit and timeout
    fn layered(&self, fetcher: SharedFetcher<T>) -> SharedFetcher<T> {
        let fetcher: SharedFetcher<T> = match self.config.fetch_timeout() {
            Some(timeout) => Arc::new(TimeoutFetcher::new(fetcher, timeout)),
            None => fetcher,
        };
        match &self.rate_limiter {
            Some(limiter) => Arc::new(RateLimitedFetcher::with_limiter(fetcher, limiter.clone())),
            None => fetcher,
        }
    }

    fn initial_state(&self, key: &str) -> ListState<T> {
        match self.config.list(key) {
            Some(list) => ListState::with_criteria(
                normalize_search(list.search.as_deref()),
                list.filters.clone(),
            ),
            None => ListState::new(),
        }
    }

    /// Get the entry for a key, creating it from config on first access
    fn entry<'a>(
        &self,
        lists: &'a mut HashMap<String, ListEntry<T>>,
        key: &str,
    ) -> &'a mut ListEntry<T> {
        lists.entry(key.to_string()).or_insert_with(|| {
            let state = self.initial_state(key);
            let (sender, _) = watch::channel(state.clone());
            debug!(key, "Created list state");
            ListEntry {
                initial_search: state.search.clone(),
                initial_filters: state.filters.clone(),
                state,
                session: self.next_session(),
                page_size: self.config.page_size_for(key),
                fetcher: None,
                sender,
            }
        })
    }

    /// Pick the fetcher for a list and check it can load
    fn resolve_fetcher(&self, key: &str, entry: &ListEntry<T>) -> Result<SharedFetcher<T>> {
        if entry.page_size == 0 {
            return Err(Error::usage(key, "page_size must be greater than 0"));
        }
        entry
            .fetcher
            .clone()
            .or_else(|| self.default_fetcher.clone())
            .ok_or_else(|| Error::missing_fetcher(key))
    }
}

/// Mark the list loading and build the request for its next page
fn dispatch<T: Clone + Send + 'static>(
    key: &str,
    entry: &mut ListEntry<T>,
    fetcher: SharedFetcher<T>,
) -> Ticket<T> {
    let request = PageRequest::new(entry.state.next_page(), entry.page_size)
        .with_search(entry.state.search.clone())
        .with_filters(entry.state.filters.clone());

    entry.state.begin_load();
    entry.publish();

    debug!(
        key,
        page = request.page,
        page_size = request.page_size,
        session = entry.session,
        "Dispatching page fetch"
    );

    Ticket {
        key: key.to_string(),
        session: entry.session,
        request,
        fetcher,
    }
}

/// Search or filter change requested by a caller
enum Criteria {
    Search(Option<String>),
    Filters(FilterMap),
}

impl Criteria {
    fn is_current<T>(&self, state: &ListState<T>) -> bool {
        match self {
            Criteria::Search(search) => state.search == *search,
            Criteria::Filters(filters) => state.filters == *filters,
        }
    }

    fn apply<T>(self, state: &mut ListState<T>) {
        match self {
            Criteria::Search(search) => state.search = search,
            Criteria::Filters(filters) => state.filters = filters,
        }
    }
}

fn normalize_search(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

impl<T: Send + 'static> Clone for PaginationController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for PaginationController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("config", &self.inner.config)
            .field("default_fetcher", &self.inner.default_fetcher.is_some())
            .finish_non_exhaustive()
    }
}
