//! Common types used throughout Solidafy Paging
//!
//! This module contains shared type definitions, type aliases,
//! and small helpers used across multiple modules.

use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Filter criteria: field name (dot-separated path) to expected value.
///
/// Ordered so that two filter sets compare and log identically regardless of
/// insertion order.
pub type FilterMap = BTreeMap<String, JsonValue>;

// ============================================================================
// JSON helpers
// ============================================================================

/// Extract a JSON value from a dot-separated path (`$.` prefix optional)
pub fn extract_path_value<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.').filter(|p| !p.is_empty()) {
        match current {
            JsonValue::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Render a JSON value as a flat string (strings unquoted)
pub fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
