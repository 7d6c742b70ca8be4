// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Paging
//!
//! Key-scoped, generic pagination and search state for client applications.
//! One controller owns the paged state of every list a UI shows; screens ask
//! it to load more, refresh, search or filter, and render its snapshots.
//!
//! ## Features
//!
//! - **Keyed lists**: independent state per key (`"documents"`, `"breed_logs"`)
//! - **At most one fetch in flight** per key; extra calls are no-ops
//! - **Stale-response guard**: results from a superseded search, filter or
//!   reset are dropped
//! - **Observable**: `tokio::sync::watch` channel per key
//! - **Pluggable fetching**: any backend behind the `PageFetcher` trait, with
//!   optional timeout and rate limit layers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_paging::{MemoryFetcher, PaginationController, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let controller = PaginationController::new(MemoryFetcher::new(load_documents()));
//!
//!     let mut updates = controller.subscribe("documents").await;
//!     controller.load_next_page("documents").await?;
//!     controller.set_search("documents", "invoice").await?;
//!
//!     while updates.changed().await.is_ok() {
//!         let state = updates.borrow_and_update().clone();
//!         render(&state);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     PaginationController<T>                    │
//! │  load_next_page  refresh  set_search  set_filters  reset       │
//! │  get_state  subscribe  configure  release                      │
//! └────────────────────────────────────────────────────────────────┘
//!                 │                                  │
//!      ┌──────────┴──────────┐            ┌──────────┴──────────┐
//!      │  ListState<T> / key │            │    PageFetcher<T>   │
//!      │  + watch channel    │            │  Timeout │ RateLimit│
//!      └─────────────────────┘            └─────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document error variants before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Page request, page result and list state
pub mod pagination;

/// Fetch capability, adapters and layers
pub mod fetch;

/// Controller configuration
pub mod config;

/// Key-scoped pagination controller
pub mod controller;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, ControllerConfig, ListConfig};
pub use controller::{ListOptions, LoadOutcome, PaginationController, SkipReason};
pub use fetch::{FnFetcher, MemoryFetcher, PageFetcher};
pub use pagination::{FetchError, ListState, LoadStatus, PageRequest, PageResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
