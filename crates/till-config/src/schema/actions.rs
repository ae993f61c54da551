use serde::{Deserialize, Serialize};

/// Outbound action configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Whether actions block further input until the server responds when
    /// they do not say otherwise via `doNotBlockForResponse`.
    pub default_block_for_response: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            default_block_for_response: true,
        }
    }
}
