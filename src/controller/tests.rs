//! Tests for PaginationController

use super::*;
use crate::config::{ControllerConfig, ListConfig};
use crate::error::{Error, Result};
use crate::fetch::{FnFetcher, MemoryFetcher, PageFetcher};
use crate::pagination::{ListState, PageRequest, PageResult};
use crate::types::FilterMap;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

// ============================================================================
// Helpers
// ============================================================================

type Reply = oneshot::Sender<Result<PageResult<u32>>>;

/// Fetcher that hands every request to the test and waits for its answer
struct GatedFetcher {
    requests: mpsc::UnboundedSender<(PageRequest, Reply)>,
}

#[async_trait]
impl PageFetcher<u32> for GatedFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<u32>> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send((request.clone(), tx))
            .map_err(|_| Error::fetch("gate closed"))?;
        rx.await.map_err(|_| Error::fetch("reply dropped"))?
    }
}

fn gated() -> (
    PaginationController<u32>,
    mpsc::UnboundedReceiver<(PageRequest, Reply)>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PaginationController::new(GatedFetcher { requests: tx }), rx)
}

/// Page of consecutive numbers out of `0..total`
fn numbers(request: &PageRequest, total: u64) -> PageResult<u32> {
    let start = request.offset().min(total);
    let end = (start + u64::from(request.page_size)).min(total);
    let items = (start as u32..end as u32).collect();
    PageResult::for_request(items, total, request)
}

fn spawn_load(
    controller: &PaginationController<u32>,
    key: &str,
) -> JoinHandle<Result<LoadOutcome>> {
    let controller = controller.clone();
    let key = key.to_string();
    tokio::spawn(async move { controller.load_next_page(&key).await })
}

fn spawn_search(
    controller: &PaginationController<u32>,
    key: &str,
    term: &str,
) -> JoinHandle<Result<LoadOutcome>> {
    let controller = controller.clone();
    let key = key.to_string();
    let term = term.to_string();
    tokio::spawn(async move { controller.set_search(&key, &term).await })
}

fn numbers_controller(total: u32) -> (PaginationController<u32>, Arc<MemoryFetcher<u32>>) {
    let fetcher = Arc::new(MemoryFetcher::new((0..total).collect()));
    (PaginationController::new(Arc::clone(&fetcher)), fetcher)
}

// ============================================================================
// Initial State Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_key_reads_initial_state() {
    let (controller, fetcher) = numbers_controller(10);

    let state = controller.get_state("never_seen").await;
    assert_eq!(state, ListState::new());
    assert!(state.items.is_empty());
    assert_eq!(state.current_page, None);
    assert_eq!(state.total_count, None);
    assert!(!state.is_loading);
    assert!(state.error.is_none());

    // Reading neither fetches nor creates state
    assert_eq!(fetcher.fetch_count(), 0);
    assert!(controller.keys().await.is_empty());
}

// ============================================================================
// Load Next Page Tests
// ============================================================================

#[tokio::test]
async fn test_load_pages_until_exhausted() {
    let (controller, fetcher) = numbers_controller(45);

    let mut lengths = Vec::new();
    for _ in 0..3 {
        let outcome = controller.load_next_page("numbers").await.unwrap();
        assert!(outcome.is_loaded());
        lengths.push(controller.get_state("numbers").await.len());
    }
    assert_eq!(lengths, vec![20, 40, 45]);

    let outcome = controller.load_next_page("numbers").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::Exhausted));

    let state = controller.get_state("numbers").await;
    assert_eq!(state.len(), 45);
    assert_eq!(state.current_page, Some(2));
    assert_eq!(state.total_count, Some(45));
    assert_eq!(state.items, (0..45).collect::<Vec<_>>());
    assert_eq!(fetcher.fetch_count(), 3);
}

#[tokio::test]
async fn test_load_reports_page_and_appended() {
    let (controller, _) = numbers_controller(25);

    assert_eq!(
        controller.load_next_page("numbers").await.unwrap(),
        LoadOutcome::Loaded {
            page: 0,
            appended: 20
        }
    );
    assert_eq!(
        controller.load_next_page("numbers").await.unwrap(),
        LoadOutcome::Loaded {
            page: 1,
            appended: 5
        }
    );
}

#[tokio::test]
async fn test_load_while_in_flight_is_skipped() {
    let (controller, mut requests) = gated();

    let first = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page, 0);
    assert!(controller.get_state("logs").await.is_loading);

    for _ in 0..5 {
        assert_eq!(
            controller.load_next_page("logs").await.unwrap(),
            LoadOutcome::Skipped(SkipReason::InFlight)
        );
    }
    assert_eq!(
        controller.refresh("logs").await.unwrap(),
        LoadOutcome::Skipped(SkipReason::InFlight)
    );

    reply.send(Ok(numbers(&request, 100))).unwrap();
    assert!(first.await.unwrap().unwrap().is_loaded());

    let state = controller.get_state("logs").await;
    assert_eq!(state.len(), 20);
    assert!(!state.is_loading);
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn test_concurrent_loads_dispatch_once() {
    let fetcher = Arc::new(
        MemoryFetcher::new((0..100u32).collect()).with_latency(Duration::from_millis(20)),
    );
    let controller = PaginationController::new(Arc::clone(&fetcher));

    let outcomes =
        futures::future::join_all((0..10).map(|_| controller.load_next_page("numbers"))).await;

    let loaded = outcomes
        .iter()
        .filter(|o| o.as_ref().unwrap().is_loaded())
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| o.as_ref().unwrap() == &LoadOutcome::Skipped(SkipReason::InFlight))
        .count();

    assert_eq!(loaded, 1);
    assert_eq!(skipped, 9);
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(controller.get_state("numbers").await.len(), 20);
}

#[tokio::test]
async fn test_failure_keeps_loaded_pages() {
    let (controller, mut requests) = gated();

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    reply.send(Ok(numbers(&request, 100))).unwrap();
    task.await.unwrap().unwrap();

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page, 1);
    reply.send(Err(Error::http_status(503, "unavailable"))).unwrap();

    let outcome = task.await.unwrap().unwrap();
    let LoadOutcome::Failed(error) = outcome.clone() else {
        panic!("Expected Failed, got {outcome:?}");
    };
    assert!(error.retryable);

    let state = controller.get_state("logs").await;
    assert_eq!(state.len(), 20);
    assert_eq!(state.current_page, Some(0));
    assert!(!state.is_loading);
    assert_eq!(
        state.error.as_ref().map(|e| e.message.as_str()),
        Some("HTTP 503: unavailable")
    );

    // Retrying asks for the same page and clears the error
    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page, 1);
    reply.send(Ok(numbers(&request, 100))).unwrap();
    task.await.unwrap().unwrap();

    let state = controller.get_state("logs").await;
    assert_eq!(state.len(), 40);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_empty_page_stops_loading() {
    let fetcher = FnFetcher::new(|request: PageRequest| async move {
        let items = if request.page == 0 { vec![1u32, 2, 3] } else { vec![] };
        Ok::<_, Error>(PageResult::for_request(items, 100, &request))
    });
    let controller = PaginationController::new(fetcher);

    controller.load_next_page("short").await.unwrap();
    controller.load_next_page("short").await.unwrap();

    let state = controller.get_state("short").await;
    assert_eq!(state.total_count, Some(3));
    assert_eq!(
        controller.load_next_page("short").await.unwrap(),
        LoadOutcome::Skipped(SkipReason::Exhausted)
    );
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_round_trip() {
    let (controller, mut requests) = gated();

    for _ in 0..3 {
        let task = spawn_load(&controller, "logs");
        let (request, reply) = requests.recv().await.unwrap();
        reply.send(Ok(numbers(&request, 100))).unwrap();
        task.await.unwrap().unwrap();
    }
    assert_eq!(controller.get_state("logs").await.current_page, Some(2));

    let controller_clone = controller.clone();
    let task = tokio::spawn(async move { controller_clone.refresh("logs").await });
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page, 0);

    let during = controller.get_state("logs").await;
    assert!(during.items.is_empty());
    assert_eq!(during.current_page, None);
    assert_eq!(during.total_count, None);
    assert!(during.is_loading);

    reply.send(Ok(numbers(&request, 100))).unwrap();
    assert!(task.await.unwrap().unwrap().is_loaded());

    let after = controller.get_state("logs").await;
    assert_eq!(after.current_page, Some(0));
    assert_eq!(after.items, (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_refresh_picks_up_external_changes() {
    let (controller, fetcher) = numbers_controller(5);

    controller.load_next_page("numbers").await.unwrap();
    fetcher.push(99).await;
    assert_eq!(
        controller.load_next_page("numbers").await.unwrap(),
        LoadOutcome::Skipped(SkipReason::Exhausted)
    );

    controller.refresh("numbers").await.unwrap();
    let state = controller.get_state("numbers").await;
    assert_eq!(state.len(), 6);
    assert_eq!(state.items.last(), Some(&99));
}

// ============================================================================
// Search / Filter Tests
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
struct Doc {
    title: String,
    status: String,
}

fn docs_controller() -> (PaginationController<Doc>, Arc<MemoryFetcher<Doc>>) {
    let docs = (0..30)
        .map(|i| Doc {
            title: if i % 3 == 0 {
                format!("Invoice {i}")
            } else {
                format!("Report {i}")
            },
            status: if i % 2 == 0 { "draft" } else { "published" }.to_string(),
        })
        .collect();
    let fetcher = Arc::new(MemoryFetcher::new(docs));
    (PaginationController::new(Arc::clone(&fetcher)), fetcher)
}

#[tokio::test]
async fn test_set_search_reloads_from_first_page() {
    let (controller, _) = docs_controller();

    controller.load_next_page("docs").await.unwrap();
    assert_eq!(controller.get_state("docs").await.len(), 20);

    let outcome = controller.set_search("docs", "invoice").await.unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            page: 0,
            appended: 10
        }
    );

    let state = controller.get_state("docs").await;
    assert_eq!(state.search.as_deref(), Some("invoice"));
    assert_eq!(state.total_count, Some(10));
    assert!(state.items.iter().all(|d| d.title.starts_with("Invoice")));
}

#[tokio::test]
async fn test_set_search_same_term_is_idempotent() {
    let (controller, fetcher) = docs_controller();

    controller.set_search("docs", "report").await.unwrap();
    let before = controller.get_state("docs").await;
    let fetches = fetcher.fetch_count();

    assert_eq!(
        controller.set_search("docs", "report").await.unwrap(),
        LoadOutcome::Skipped(SkipReason::Unchanged)
    );
    assert_eq!(
        controller.set_search("docs", "  report ").await.unwrap(),
        LoadOutcome::Skipped(SkipReason::Unchanged)
    );

    assert_eq!(controller.get_state("docs").await, before);
    assert_eq!(fetcher.fetch_count(), fetches);
}

#[tokio::test]
async fn test_blank_search_on_fresh_list_is_unchanged() {
    let (controller, fetcher) = docs_controller();

    assert_eq!(
        controller.clear_search("docs").await.unwrap(),
        LoadOutcome::Skipped(SkipReason::Unchanged)
    );
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_clear_search_reloads_everything() {
    let (controller, _) = docs_controller();

    controller.set_search("docs", "invoice").await.unwrap();
    controller.clear_search("docs").await.unwrap();

    let state = controller.get_state("docs").await;
    assert!(state.search.is_none());
    assert_eq!(state.total_count, Some(30));
}

#[tokio::test]
async fn test_set_filters() {
    let (controller, fetcher) = docs_controller();

    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!("published"));

    assert!(controller
        .set_filters("docs", filters.clone())
        .await
        .unwrap()
        .is_loaded());
    let state = controller.get_state("docs").await;
    assert_eq!(state.total_count, Some(15));
    assert!(state.items.iter().all(|d| d.status == "published"));

    let fetches = fetcher.fetch_count();
    assert_eq!(
        controller.set_filters("docs", filters).await.unwrap(),
        LoadOutcome::Skipped(SkipReason::Unchanged)
    );
    assert_eq!(fetcher.fetch_count(), fetches);
}

#[tokio::test]
async fn test_search_and_filters_combine() {
    let (controller, _) = docs_controller();

    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!("draft"));
    controller.set_filters("docs", filters).await.unwrap();
    controller.set_search("docs", "invoice").await.unwrap();

    let state = controller.get_state("docs").await;
    // i % 6 == 0 below 30
    assert_eq!(state.total_count, Some(5));
}

#[tokio::test]
async fn test_stale_search_result_is_discarded() {
    let (controller, mut requests) = gated();

    let search_a = spawn_search(&controller, "logs", "a");
    let (request_a, reply_a) = requests.recv().await.unwrap();
    assert_eq!(request_a.search.as_deref(), Some("a"));

    let search_b = spawn_search(&controller, "logs", "b");
    let (request_b, reply_b) = requests.recv().await.unwrap();
    assert_eq!(request_b.search.as_deref(), Some("b"));
    assert_eq!(request_b.page, 0);

    // "a" answers first but its session is over
    reply_a
        .send(Ok(PageResult::for_request(vec![1], 1, &request_a)))
        .unwrap();
    assert_eq!(search_a.await.unwrap().unwrap(), LoadOutcome::Discarded);

    let state = controller.get_state("logs").await;
    assert!(state.items.is_empty());
    assert!(state.is_loading);

    reply_b
        .send(Ok(PageResult::for_request(vec![2, 3], 2, &request_b)))
        .unwrap();
    assert!(search_b.await.unwrap().unwrap().is_loaded());

    let state = controller.get_state("logs").await;
    assert_eq!(state.items, vec![2, 3]);
    assert_eq!(state.search.as_deref(), Some("b"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_stale_result_arriving_last_is_discarded() {
    let (controller, mut requests) = gated();

    let search_a = spawn_search(&controller, "logs", "a");
    let (request_a, reply_a) = requests.recv().await.unwrap();
    let search_b = spawn_search(&controller, "logs", "b");
    let (request_b, reply_b) = requests.recv().await.unwrap();

    reply_b
        .send(Ok(PageResult::for_request(vec![2], 1, &request_b)))
        .unwrap();
    search_b.await.unwrap().unwrap();

    reply_a
        .send(Ok(PageResult::for_request(vec![1], 1, &request_a)))
        .unwrap();
    assert_eq!(search_a.await.unwrap().unwrap(), LoadOutcome::Discarded);

    assert_eq!(controller.get_state("logs").await.items, vec![2]);
}

// ============================================================================
// Reset / Release Tests
// ============================================================================

#[tokio::test]
async fn test_reset_clears_everything_without_fetching() {
    let (controller, fetcher) = docs_controller();

    controller.set_search("docs", "invoice").await.unwrap();
    let fetches = fetcher.fetch_count();

    controller.reset("docs").await;

    assert_eq!(controller.get_state("docs").await, ListState::new());
    assert_eq!(fetcher.fetch_count(), fetches);
}

#[tokio::test]
async fn test_reset_mid_flight_discards_result() {
    let (controller, mut requests) = gated();

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();

    controller.reset("logs").await;
    let state = controller.get_state("logs").await;
    assert!(!state.is_loading);
    assert!(state.items.is_empty());

    reply.send(Ok(numbers(&request, 100))).unwrap();
    assert_eq!(task.await.unwrap().unwrap(), LoadOutcome::Discarded);
    assert_eq!(controller.get_state("logs").await, ListState::new());

    // The list is usable again straight away
    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page, 0);
    reply.send(Ok(numbers(&request, 100))).unwrap();
    assert!(task.await.unwrap().unwrap().is_loaded());
}

#[tokio::test]
async fn test_reset_unknown_key_is_noop() {
    let (controller, _) = numbers_controller(10);
    controller.reset("nothing").await;
    assert!(controller.keys().await.is_empty());
}

#[tokio::test]
async fn test_release_drops_state_and_discards_in_flight() {
    let (controller, mut requests) = gated();
    let mut watcher = controller.subscribe("logs").await;

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();

    assert!(controller.release("logs").await);
    assert!(!controller.release("logs").await);
    assert!(controller.keys().await.is_empty());

    reply.send(Ok(numbers(&request, 100))).unwrap();
    assert_eq!(task.await.unwrap().unwrap(), LoadOutcome::Discarded);
    assert_eq!(controller.get_state("logs").await, ListState::new());

    // Drain the loading notification, then the closed channel shows up
    while watcher.changed().await.is_ok() {}
}

// ============================================================================
// Key Isolation Tests
// ============================================================================

#[tokio::test]
async fn test_keys_are_independent() {
    let (controller, mut requests) = gated();

    let logs = spawn_load(&controller, "logs");
    let (logs_request, logs_reply) = requests.recv().await.unwrap();

    // "docs" loads while "logs" is still in flight
    let docs = spawn_load(&controller, "docs");
    let (docs_request, docs_reply) = requests.recv().await.unwrap();
    docs_reply.send(Ok(numbers(&docs_request, 3))).unwrap();
    assert!(docs.await.unwrap().unwrap().is_loaded());

    assert!(controller.get_state("logs").await.is_loading);
    assert_eq!(controller.get_state("docs").await.len(), 3);

    logs_reply.send(Ok(numbers(&logs_request, 50))).unwrap();
    logs.await.unwrap().unwrap();

    assert_eq!(
        controller.keys().await,
        vec!["docs".to_string(), "logs".to_string()]
    );
}

// ============================================================================
// Caller Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_load_outlives_caller_timeout() {
    let fetcher =
        MemoryFetcher::new((0..50u32).collect()).with_latency(Duration::from_millis(100));
    let controller = PaginationController::new(fetcher);

    let waited =
        tokio::time::timeout(Duration::from_millis(10), controller.load_next_page("numbers"))
            .await;
    assert!(waited.is_err());
    assert!(controller.get_state("numbers").await.is_loading);

    // The fetch keeps running and its page still lands
    tokio::time::sleep(Duration::from_millis(300)).await;
    let state = controller.get_state("numbers").await;
    assert!(!state.is_loading);
    assert_eq!(state.len(), 20);

    let outcome = controller.load_next_page("numbers").await.unwrap();
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            page: 1,
            appended: 20
        }
    );
    assert!(controller.refresh("numbers").await.unwrap().is_loaded());
}

#[tokio::test]
async fn test_aborted_caller_does_not_leave_list_loading() {
    let (controller, mut requests) = gated();
    let mut watcher = controller.subscribe("logs").await;

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    reply.send(Ok(numbers(&request, 30))).unwrap();
    let state = watcher
        .wait_for(|state| !state.is_loading && state.len() == 20)
        .await
        .unwrap()
        .clone();
    assert_eq!(state.current_page, Some(0));

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page, 1);
    reply.send(Ok(numbers(&request, 30))).unwrap();
    assert!(task.await.unwrap().unwrap().is_loaded());
    assert_eq!(controller.get_state("logs").await.len(), 30);
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[tokio::test]
async fn test_missing_fetcher_is_usage_error() {
    let controller: PaginationController<u32> =
        PaginationController::from_config(ControllerConfig::default()).unwrap();

    let err = controller.load_next_page("logs").await.unwrap_err();
    assert!(matches!(err, Error::MissingFetcher { ref key } if key == "logs"));
    assert!(err.is_usage());

    // Nothing was absorbed into state
    let state = controller.get_state("logs").await;
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_unchanged_criteria_without_fetcher_is_noop() {
    let config = ControllerConfig::default()
        .with_list("logs", ListConfig::default().search("cow"));
    let controller: PaginationController<u32> = PaginationController::from_config(config).unwrap();

    let outcome = controller.set_search("logs", " cow ").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::Unchanged));
    let outcome = controller.set_filters("logs", FilterMap::new()).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::Unchanged));

    // A real change still needs a fetcher and leaves state untouched
    let err = controller.set_search("logs", "sheep").await.unwrap_err();
    assert!(matches!(err, Error::MissingFetcher { .. }));
    let state = controller.get_state("logs").await;
    assert_eq!(state.search.as_deref(), Some("cow"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_zero_page_size_is_usage_error() {
    let (controller, _) = numbers_controller(10);

    let err = controller
        .configure("numbers", ListOptions::new().page_size(0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Usage { .. }));

    let config = ControllerConfig::default().with_default_page_size(0);
    let err =
        PaginationController::with_config(config, MemoryFetcher::new(vec![1u32])).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[tokio::test]
async fn test_configure_per_key_fetcher_and_page_size() {
    let controller: PaginationController<u32> =
        PaginationController::from_config(ControllerConfig::default()).unwrap();

    controller
        .configure(
            "small",
            ListOptions::new()
                .page_size(5)
                .fetcher(MemoryFetcher::new((0..12u32).collect())),
        )
        .await
        .unwrap();

    assert_eq!(
        controller.load_next_page("small").await.unwrap(),
        LoadOutcome::Loaded {
            page: 0,
            appended: 5
        }
    );
    assert!(controller.load_next_page("other").await.is_err());
}

#[tokio::test]
async fn test_config_list_settings_apply() {
    let (tx, mut requests) = mpsc::unbounded_channel();
    let config = ControllerConfig::default().with_list(
        "docs",
        ListConfig::new()
            .page_size(7)
            .search("invoice")
            .filter("status", "draft"),
    );
    let controller =
        PaginationController::with_config(config, GatedFetcher { requests: tx }).unwrap();

    let initial = controller.get_state("docs").await;
    assert_eq!(initial.search.as_deref(), Some("invoice"));
    assert_eq!(initial.filters.get("status"), Some(&json!("draft")));

    let task = spawn_load(&controller, "docs");
    let (request, reply) = requests.recv().await.unwrap();
    assert_eq!(request.page_size, 7);
    assert_eq!(request.search.as_deref(), Some("invoice"));
    assert_eq!(request.filters.get("status"), Some(&json!("draft")));
    reply.send(Ok(numbers(&request, 3))).unwrap();
    task.await.unwrap().unwrap();

    // Reset returns to the configured criteria
    let task = spawn_search(&controller, "docs", "report");
    let (request, reply) = requests.recv().await.unwrap();
    reply.send(Ok(numbers(&request, 0))).unwrap();
    task.await.unwrap().unwrap();

    controller.reset("docs").await;
    assert_eq!(controller.get_state("docs").await, initial);
}

#[tokio::test]
async fn test_configure_resets_session() {
    let (controller, _) = numbers_controller(50);

    controller.load_next_page("numbers").await.unwrap();
    controller
        .configure("numbers", ListOptions::new().page_size(10).search("x"))
        .await
        .unwrap();

    let state = controller.get_state("numbers").await;
    assert!(state.items.is_empty());
    assert_eq!(state.search.as_deref(), Some("x"));
}

#[tokio::test]
async fn test_fetch_timeout_from_config() {
    let config = ControllerConfig::default().with_fetch_timeout(Duration::from_millis(20));
    let fetcher = FnFetcher::new(|_request: PageRequest| async move {
        futures::future::pending::<Result<PageResult<u32>>>().await
    });
    let controller = PaginationController::with_config(config, fetcher).unwrap();

    let outcome = controller.load_next_page("slow").await.unwrap();
    assert!(outcome.is_failed());

    let state = controller.get_state("slow").await;
    let error = state.error.unwrap();
    assert_eq!(error.message, "Fetch timeout after 20ms");
    assert!(error.retryable);
    assert!(!state.is_loading);
}

// ============================================================================
// Observation Tests
// ============================================================================

#[tokio::test]
async fn test_subscribe_sees_transitions() {
    let (controller, mut requests) = gated();
    let mut watcher = controller.subscribe("logs").await;
    assert!(!watcher.borrow_and_update().is_loading);

    let task = spawn_load(&controller, "logs");
    let (request, reply) = requests.recv().await.unwrap();

    watcher.changed().await.unwrap();
    assert!(watcher.borrow_and_update().is_loading);

    reply.send(Ok(numbers(&request, 30))).unwrap();
    task.await.unwrap().unwrap();

    watcher.changed().await.unwrap();
    let state = watcher.borrow_and_update().clone();
    assert!(!state.is_loading);
    assert_eq!(state.len(), 20);
    assert_eq!(state.total_count, Some(30));
}

#[tokio::test]
async fn test_subscribers_see_failures() {
    let fetcher = FnFetcher::new(|_request: PageRequest| async move {
        Err::<PageResult<u32>, _>(Error::fetch("offline"))
    });
    let controller = PaginationController::new(fetcher);
    let mut watcher = controller.subscribe("logs").await;

    controller.load_next_page("logs").await.unwrap();

    assert!(watcher.has_changed().unwrap());
    let state = watcher.borrow_and_update().clone();
    assert_eq!(
        state.error.map(|e| e.message),
        Some("Fetch failed: offline".to_string())
    );
}

#[tokio::test]
async fn test_clones_share_state() {
    let (controller, _) = numbers_controller(30);
    let other = controller.clone();

    other.load_next_page("numbers").await.unwrap();
    assert_eq!(controller.get_state("numbers").await.len(), 20);
}

#[test]
fn test_controller_is_usable_from_sync_code() {
    let (controller, _) = numbers_controller(3);
    let outcome = tokio_test::block_on(controller.load_next_page("numbers")).unwrap();
    assert!(outcome.is_loaded());
}
