use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use till_config::KeybindingConfig;

/// The externally owned "keybindings enabled" flag.
///
/// Clones share the same flag. The registry reads it on every register,
/// update and dispatch, so flipping it takes effect immediately; it never
/// replays key presses that arrived while it was off.
#[derive(Debug, Clone)]
pub struct KeybindingSwitch(Arc<AtomicBool>);

impl KeybindingSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn from_config(config: &KeybindingConfig) -> Self {
        Self::new(config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

impl Default for KeybindingSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}
