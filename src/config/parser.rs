//! Config loading
//!
//! Parses and validates controller configuration. YAML is the documented
//! format; JSON parses too since it is a YAML subset.

use super::types::ControllerConfig;
use crate::error::{Error, Result, ResultExt};
use std::fs;
use std::path::Path;

/// Load a controller config from a file
pub fn load_config(path: impl AsRef<Path>) -> Result<ControllerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    load_config_from_str(&content)
}

/// Load a controller config from a YAML (or JSON) string
pub fn load_config_from_str(yaml: &str) -> Result<ControllerConfig> {
    let config: ControllerConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse controller config: {e}")))?;

    config.validate()?;
    Ok(config)
}
