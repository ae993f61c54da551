//! Reactive per-action disabled state.

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::debug;

/// One `watch` receiver per action name. `true` means disabled.
#[derive(Debug, Default)]
pub struct DisablerSet {
    disablers: HashMap<String, watch::Receiver<bool>>,
}

impl DisablerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the disabler for `action`, replacing any earlier one.
    pub fn register(&mut self, action: &str, disabled: watch::Receiver<bool>) {
        if self.disablers.insert(action.to_string(), disabled).is_some() {
            debug!("replacing disabler for action '{action}'");
        }
    }

    pub fn remove(&mut self, action: &str) -> bool {
        self.disablers.remove(action).is_some()
    }

    /// Current value; actions without a disabler are enabled.
    pub fn is_disabled(&self, action: &str) -> bool {
        self.disablers
            .get(action)
            .is_some_and(|rx| *rx.borrow())
    }

    /// A receiver tracking the action's disabled state. For an action with
    /// no disabler this holds `false` and never changes.
    pub fn watch(&self, action: &str) -> watch::Receiver<bool> {
        match self.disablers.get(action) {
            Some(rx) => rx.clone(),
            None => watch::channel(false).1,
        }
    }
}
