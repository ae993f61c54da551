//! Tests for TOML config loading.

use super::*;
use crate::schema::LogLevel;
use std::path::Path;
use till_common::ConfigError;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_till_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[keybindings]
history_limit = 10
ignore_repeats = false

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.keybindings.history_limit, 10);
    assert!(!config.keybindings.ignore_repeats);
    assert_eq!(config.logging.level, LogLevel::Debug);
    // Defaults preserved
    assert!(config.keybindings.enabled);
    assert_eq!(config.keybindings.event_capacity, 64);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn unknown_log_level_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn invalid_values_are_returned_with_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[keybindings]\nhistory_limit = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.keybindings.history_limit, 0);
}

#[test]
fn default_path_ends_with_till_config() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("till/config.toml"));
    }
}
