use till_common::KeybindingError;
use tracing::warn;

use super::chord::{Chord, Modifier};
use super::split::{split_keys, split_unescaped, unescape, TOKEN_SEPARATOR};
use crate::key_event::KeyDown;

/// Normalized form of a key event that carries no key value at all (browser
/// autofill fires these). No parsed chord can produce it, so such events
/// never match a binding.
pub const AUTOFILL_SENTINEL: &str = "\u{0}autofill";

/// Anything that can be reduced to a normalized chord string.
pub trait KeyLike {
    /// `None` when there is no discernible key.
    fn normalized_key(&self) -> Option<String>;
}

impl KeyLike for Chord {
    fn normalized_key(&self) -> Option<String> {
        if self.key.is_empty() {
            None
        } else {
            Some(self.normalized())
        }
    }
}

impl KeyLike for KeyDown {
    fn normalized_key(&self) -> Option<String> {
        self.chord().and_then(|chord| chord.normalized_key())
    }
}

/// A spec string stands for its first chord.
impl KeyLike for str {
    fn normalized_key(&self) -> Option<String> {
        parse(self).first().and_then(|chord| chord.normalized_key())
    }
}

impl KeyLike for String {
    fn normalized_key(&self) -> Option<String> {
        self.as_str().normalized_key()
    }
}

impl<T: KeyLike + ?Sized> KeyLike for &T {
    fn normalized_key(&self) -> Option<String> {
        (**self).normalized_key()
    }
}

/// Canonical string for a key press or chord.
pub fn normalize<K: KeyLike + ?Sized>(key: &K) -> String {
    key.normalized_key()
        .unwrap_or_else(|| AUTOFILL_SENTINEL.to_string())
}

/// Parses a keybind spec into its chords. Malformed chords are logged and
/// skipped; an empty spec yields no chords.
pub fn parse(spec: &str) -> Vec<Chord> {
    split_keys(spec)
        .iter()
        .filter_map(|piece| match try_parse_chord(piece) {
            Ok(chord) => Some(chord),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

/// Parses a single chord spec (no unescaped commas). Every token but the
/// last is a modifier; the last is the key.
pub fn try_parse_chord(piece: &str) -> Result<Chord, KeybindingError> {
    let tokens = split_unescaped(piece, TOKEN_SEPARATOR);
    let Some((last, modifiers)) = tokens.split_last() else {
        return Err(invalid(piece, "empty keybind"));
    };

    let key = unescape(last.trim());
    if key.is_empty() {
        return Err(invalid(piece, "keybind has no key component"));
    }

    let mut chord = Chord::new(&key);
    for token in modifiers {
        let token = token.trim();
        match Modifier::from_token(token) {
            Some(modifier) => chord.set(modifier),
            None => {
                return Err(KeybindingError::UnknownModifier {
                    spec: piece.to_string(),
                    modifier: token.to_string(),
                })
            }
        }
    }
    Ok(chord)
}

/// `true` when both sides have a key and their normalized forms match.
pub fn equal<A, B>(a: &A, b: &B) -> bool
where
    A: KeyLike + ?Sized,
    B: KeyLike + ?Sized,
{
    match (a.normalized_key(), b.normalized_key()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// `true` when `key` matches any chord of `spec`.
pub fn has_key<K: KeyLike + ?Sized>(key: &K, spec: &str) -> bool {
    let Some(normalized) = key.normalized_key() else {
        return false;
    };
    parse(spec)
        .iter()
        .any(|chord| chord.normalized() == normalized)
}

fn invalid(spec: &str, reason: &str) -> KeybindingError {
    KeybindingError::InvalidChord {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}
