//! Configuration module
//!
//! Controller defaults and per-list settings.
//!
//! # Overview
//!
//! - `ControllerConfig` - page size default, fetch timeout, rate limit, lists
//! - `ListConfig` - page size and initial criteria for one list
//! - `load_config` / `load_config_from_str` - YAML/JSON loading with validation

mod parser;
mod types;

pub use parser::{load_config, load_config_from_str};
pub use types::{ControllerConfig, ListConfig, DEFAULT_PAGE_SIZE};
