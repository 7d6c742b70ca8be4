//! Fetch module
//!
//! The fetch capability the controller delegates to, plus adapters and layers.
//!
//! # Overview
//!
//! - `PageFetcher` - trait implemented by host backends
//! - `FnFetcher` - adapter for async closures
//! - `MemoryFetcher` - pages over a local collection
//! - `TimeoutFetcher` / `RateLimitedFetcher` - wrappers applied from config

mod fetcher;
mod layers;
mod memory;
mod rate_limit;

pub use fetcher::{FnFetcher, PageFetcher};
pub use layers::TimeoutFetcher;
pub use memory::MemoryFetcher;
pub use rate_limit::{RateLimitedFetcher, RateLimiter, RateLimiterConfig};
