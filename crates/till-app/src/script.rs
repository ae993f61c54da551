//! The keytrace script format.
//!
//! One JSON object per line; blank lines and lines starting with `#` are
//! skipped.
//!
//! ```text
//! {"message": {"type": "Screen", "id": "sale", "items": [{"action": "Tender", "keybind": "F10"}]}}
//! {"key": {"key": "F10"}}
//! {"unblock": true}
//! {"confirm": false}
//! ```

use std::path::Path;

use serde::Deserialize;
use till_common::{SessionMessage, TillError};
use till_keybinding::KeyDown;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// A message pushed by the server.
    Message(SessionMessage),
    /// A physical key-down.
    Key(KeyDown),
    /// The transport reports the outstanding response arrived.
    Unblock(bool),
    /// The user answers the open confirmation dialog.
    Confirm(bool),
}

pub fn parse_script(text: &str) -> Result<Vec<Step>, TillError> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| TillError::Other(format!("script line {number}: {e}")))
        })
        .collect()
}

pub fn load_script(path: &Path) -> Result<Vec<Step>, TillError> {
    let text = std::fs::read_to_string(path)?;
    let steps = parse_script(&text)?;
    tracing::info!("loaded {} script steps from {}", steps.len(), path.display());
    Ok(steps)
}
