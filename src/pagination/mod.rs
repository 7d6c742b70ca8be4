//! Pagination module
//!
//! Data model shared by the controller, fetchers and observers.
//!
//! # Overview
//!
//! - `PageRequest` - what the controller asks a fetcher for
//! - `PageResult` - what a fetcher answers with
//! - `ListState` - accumulated state for one keyed list

mod state;
mod types;

pub use state::{FetchError, ListState, LoadStatus};
pub use types::{PageRequest, PageResult};
