//! Chord parsing and normalization.
//!
//! A keybind spec such as `"Ctrl+P, Escape"` holds one or more chords
//! separated by unescaped commas; within a chord, tokens are separated by
//! unescaped `+`. A backslash escapes a following `,` or `+` so that those
//! characters can be used as key names (`"Ctrl+\\,"`).
//!
//! Every chord, and every physical key press, normalizes to a lower-case
//! string of the form `ctrl+alt+shift+meta+key` (absent modifiers omitted).
//! Two keys are equal iff their normalized forms are.

mod chord;
mod parse;
mod split;

pub use chord::{Chord, Modifier};
pub use parse::{equal, has_key, normalize, parse, try_parse_chord, KeyLike, AUTOFILL_SENTINEL};
pub use split::split_keys;

#[cfg(test)]
mod tests;
