use serde::{Deserialize, Serialize};

/// Keyboard routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    /// Master switch. When off, zones cannot be registered or updated and no
    /// key press is dispatched.
    pub enabled: bool,
    /// How many activations are remembered for "restore previous" (valid range: 1-1000).
    pub history_limit: usize,
    /// Drop auto-repeat key-downs before they reach any zone.
    pub ignore_repeats: bool,
    /// Buffer size of every key-down event stream (valid range: 1-4096).
    pub event_capacity: usize,
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_limit: 100,
            ignore_repeats: true,
            event_capacity: 64,
        }
    }
}
