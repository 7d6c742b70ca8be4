//! Controller module
//!
//! Key-scoped pagination state with at-most-one fetch in flight per key.
//!
//! # Overview
//!
//! The controller module provides:
//! - `PaginationController` - owns one `ListState` per key
//! - `ListOptions` - per-list page size, criteria and fetcher
//! - `LoadOutcome` - what a load, refresh or criteria change did
//!
//! # State machine
//!
//! ```text
//!            load / refresh / criteria change
//!   ┌──────┐ ───────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                  │ Loading │
//!   └──────┘ ◀─────────────────────────────── └─────────┘
//!              page applied | error stored
//! ```
//!
//! `reset` and a changed search or filter start a new session from either
//! state. A result tagged with an ended session is dropped.

mod list_controller;
mod types;

pub use list_controller::PaginationController;
pub use types::{ListOptions, LoadOutcome, SkipReason};

#[cfg(test)]
mod tests;
