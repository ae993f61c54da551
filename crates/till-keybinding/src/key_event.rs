//! Physical key-down events as delivered by the UI layer.

use serde::{Deserialize, Serialize};

use crate::keymap::{Chord, Modifier};

/// A key-down captured at the top of the UI tree.
///
/// Field names also accept the browser spellings (`ctrlKey`, `metaKey`, ...)
/// so recorded key events can be replayed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDown {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, alias = "ctrlKey")]
    pub ctrl: bool,
    #[serde(default, alias = "altKey")]
    pub alt: bool,
    #[serde(default, alias = "shiftKey")]
    pub shift: bool,
    #[serde(default, alias = "metaKey")]
    pub meta: bool,
    #[serde(default)]
    pub repeat: bool,
}

impl KeyDown {
    pub fn new(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::default()
        }
    }

    /// A synthetic event without a key value.
    pub fn unidentified() -> Self {
        Self::default()
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// The pressed chord, or `None` when the event has no key value.
    pub fn chord(&self) -> Option<Chord> {
        let key = self.key.as_deref().filter(|k| !k.is_empty())?;
        let mut chord = Chord::new(key);
        for (held, modifier) in [
            (self.ctrl, Modifier::Ctrl),
            (self.alt, Modifier::Alt),
            (self.shift, Modifier::Shift),
            (self.meta, Modifier::Meta),
        ] {
            if held {
                chord.set(modifier);
            }
        }
        Some(chord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_field_names_deserialize() {
        let key: KeyDown =
            serde_json::from_str(r#"{"key": "Q", "ctrlKey": true, "metaKey": true}"#).unwrap();
        assert_eq!(key, KeyDown::new("Q").with_ctrl().with_meta());
        assert!(!key.repeat);
    }

    #[test]
    fn missing_key_has_no_chord() {
        assert!(KeyDown::unidentified().chord().is_none());
        assert!(KeyDown {
            key: Some(String::new()),
            ..KeyDown::default()
        }
        .chord()
        .is_none());
    }

    #[test]
    fn chord_carries_modifiers() {
        let chord = KeyDown::new("F2").with_alt().with_shift().chord().unwrap();
        assert_eq!(chord.normalized(), "alt+shift+f2");
    }
}
