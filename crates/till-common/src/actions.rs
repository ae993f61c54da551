//! Server-declared action items and the gate that executes them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An action the server allows the terminal to send, as it appears inside a
/// screen or dialog payload.
///
/// Only `action` is required. Fields the client does not interpret are kept
/// in `extra` so the item can be echoed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keybind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_dialog: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_if_blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_block_for_response: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionItem {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_keybind(mut self, keybind: impl Into<String>) -> Self {
        self.keybind = Some(keybind.into());
        self
    }

    /// Enabled unless explicitly `false`.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    pub fn blocks_for_response(&self) -> bool {
        self.do_not_block_for_response != Some(true)
    }

    pub fn queues_if_blocked(&self) -> bool {
        self.queue_if_blocked == Some(true)
    }

    pub fn requires_confirmation(&self) -> bool {
        matches!(&self.confirmation_dialog, Some(v) if !v.is_null())
    }
}

/// The collaborator that performs, queues or refuses outbound actions.
///
/// The keybinding registry only ever talks to actions through this trait.
pub trait ActionGate {
    /// Fire the action. Implementations substitute `item.default_payload`
    /// when `payload` is `None`.
    fn do_action(&self, item: &ActionItem, payload: Option<Value>);

    /// `true` while a previously sent blocking action awaits its response.
    fn action_blocked(&self) -> bool;

    /// Reactive disabled state registered for an action name.
    fn action_is_disabled(&self, action: &str) -> bool;
}
