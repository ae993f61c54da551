//! Configuration validation.
//!
//! Each section has its own check; errors are collected into a single
//! `ConfigError` so the user sees every problem at once.

mod helpers;

use crate::schema::TillConfig;
use helpers::validate_range;
use till_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TillConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_keybindings(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_keybindings(errors: &mut Vec<String>, config: &TillConfig) {
    validate_range(
        errors,
        "keybindings.history_limit",
        config.keybindings.history_limit,
        1,
        1000,
    );
    validate_range(
        errors,
        "keybindings.event_capacity",
        config.keybindings.event_capacity,
        1,
        4096,
    );
}
