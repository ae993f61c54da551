//! Till client configuration.
//!
//! TOML-based configuration for the keybinding and action-dispatch core.
//! Every section uses serde defaults so a partial (or absent) config file
//! works out of the box.
//!
//! ```rust,no_run
//! use till_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! assert!(config.keybindings.history_limit > 0);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ActionConfig, KeybindingConfig, LogLevel, LoggingConfig, TillConfig};
pub use toml_loader::{default_config_path, load_default, load_from_path};

use till_common::ConfigError;

/// Load config from the platform default path and validate it.
pub fn load_config() -> Result<TillConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TillConfig::default();
        assert!(validation::validate(&config).is_ok());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = TillConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: TillConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
