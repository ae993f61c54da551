//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod actions;
mod keybindings;
mod logging;

pub use actions::*;
pub use keybindings::*;
pub use logging::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TillConfig {
    pub keybindings: KeybindingConfig,
    pub actions: ActionConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: TillConfig = toml::from_str("").unwrap();
        assert_eq!(config, TillConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: TillConfig = toml::from_str(
            r#"
[keybindings]
enabled = false
"#,
        )
        .unwrap();
        assert!(!config.keybindings.enabled);
        assert_eq!(config.keybindings.history_limit, 100);
        assert!(config.actions.default_block_for_response);
        assert_eq!(config.logging.level, LogLevel::Info);
    }
}
