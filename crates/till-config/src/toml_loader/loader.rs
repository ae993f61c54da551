//! Core TOML config loading: read from path or platform default.

use std::path::Path;

use crate::schema::TillConfig;
use crate::validation;
use till_common::ConfigError;
use tracing::{info, warn};

use super::paths::default_config_path;

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. A config that parses but fails
/// validation is returned as-is with a warning.
pub fn load_from_path(path: &Path) -> Result<TillConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: TillConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path, falling back to
/// defaults when no file exists there.
pub fn load_default() -> Result<TillConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, using defaults", path.display());
            Ok(TillConfig::default())
        }
        Err(e) => Err(e),
    }
}
