use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::split::escape;

/// A keyboard modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    /// Cmd on macOS, the Windows key elsewhere.
    Meta,
}

impl Modifier {
    /// Accepts the spellings people actually type in keybind specs.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "ctrl" | "ctl" | "control" => Some(Modifier::Ctrl),
            "alt" | "opt" | "option" => Some(Modifier::Alt),
            "shift" | "sft" => Some(Modifier::Shift),
            "meta" | "cmd" | "command" | "super" => Some(Modifier::Meta),
            _ => None,
        }
    }

    /// The normalized key name of the modifier key itself.
    pub fn key_name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "control",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }
}

/// One normalized key combination.
///
/// Equality and hashing go through [`Chord::normalized`], so `Control` held
/// with the ctrl flag equals plain `Control`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chord {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Chord {
    pub fn new(key: &str) -> Self {
        Self {
            key: canonical_key_name(key),
            ..Self::default()
        }
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.set(modifier);
        self
    }

    pub fn set(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Shift => self.shift = true,
            Modifier::Meta => self.meta = true,
        }
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Shift => self.shift,
            Modifier::Meta => self.meta,
        }
    }

    /// Canonical `ctrl+alt+shift+meta+key` form used for matching.
    pub fn normalized(&self) -> String {
        self.render(&canonical_key_name(&self.key))
    }

    /// Like [`normalized`](Self::normalized) but with `,` and `+` in the key
    /// escaped, so the result parses back to the same chord.
    pub fn to_spec(&self) -> String {
        self.render(&escape(&canonical_key_name(&self.key)))
    }

    fn render(&self, key: &str) -> String {
        let base = canonical_key_name(&self.key);
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        for modifier in [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Meta] {
            // Pressing bare Control never reads as "ctrl+control".
            if self.has(modifier) && base != modifier.key_name() {
                parts.push(modifier.prefix());
            }
        }
        parts.push(key);
        parts.join("+")
    }
}

impl PartialEq for Chord {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Chord {}

impl Hash for Chord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

/// Lower-cases a key name and folds the common aliases onto one spelling.
pub(super) fn canonical_key_name(key: &str) -> String {
    if key == " " {
        return "space".into();
    }
    if let Some(modifier) = Modifier::from_token(key) {
        return modifier.key_name().into();
    }
    let lower = key.to_lowercase();
    match lower.as_str() {
        "spacebar" => "space".into(),
        "esc" => "escape".into(),
        "return" => "enter".into(),
        "del" => "delete".into(),
        "up" => "arrowup".into(),
        "down" => "arrowdown".into(),
        "left" => "arrowleft".into(),
        "right" => "arrowright".into(),
        _ => lower,
    }
}
