pub(super) const ESCAPE: char = '\\';
pub(super) const CHORD_SEPARATOR: char = ',';
pub(super) const TOKEN_SEPARATOR: char = '+';

fn is_delimiter(c: char) -> bool {
    c == CHORD_SEPARATOR || c == TOKEN_SEPARATOR
}

/// Splits a keybind spec into its chord specs on unescaped commas.
///
/// Escape sequences are kept in the pieces so each piece can be parsed on
/// its own. Pieces are trimmed and empty pieces dropped:
/// `"ctrl+p,ctrl+a,cmd+\\,,p"` yields `["ctrl+p", "ctrl+a", "cmd+\\,", "p"]`.
pub fn split_keys(spec: &str) -> Vec<String> {
    split_unescaped(spec, CHORD_SEPARATOR)
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Single-pass scanner: splits on every `delimiter` not preceded by an
/// escape. An escape is only meaningful in front of a delimiter character;
/// anywhere else the backslash is literal.
pub(super) fn split_unescaped(s: &str, delimiter: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut escape_pending = false;

    for c in s.chars() {
        if escape_pending {
            escape_pending = false;
            current.push(ESCAPE);
            if is_delimiter(c) {
                current.push(c);
                continue;
            }
        }

        if c == ESCAPE {
            escape_pending = true;
        } else if c == delimiter {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    if escape_pending {
        current.push(ESCAPE);
    }
    pieces.push(current);
    pieces
}

/// Removes the escape in front of every escaped delimiter.
pub(super) fn unescape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut escape_pending = false;

    for c in token.chars() {
        if escape_pending {
            escape_pending = false;
            if !is_delimiter(c) {
                out.push(ESCAPE);
            }
            if c == ESCAPE {
                escape_pending = true;
                continue;
            }
            out.push(c);
        } else if c == ESCAPE {
            escape_pending = true;
        } else {
            out.push(c);
        }
    }

    if escape_pending {
        out.push(ESCAPE);
    }
    out
}

/// Inverse of [`unescape`] for a bare key name.
pub(super) fn escape(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if is_delimiter(c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}
