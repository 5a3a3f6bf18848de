//! Scalar handling for configuration values.
//!
//! Every variable is stored as escaped text. These functions convert between
//! that raw form and typed values, and validate variable names.
//!
//! The escape table is deliberately small: `\t`, `\r`, `\n`, `\0`, `\#` and
//! `\}`. A backslash followed by any other character is ordinary text.

use std::borrow::Cow;

use crate::error::{ConversionError, Error, Result, ScalarKind};

/// Check whether `c` may start a variable name.
#[inline]
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check whether `c` may continue a variable name.
#[inline]
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check whether `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => chars.all(is_name_char),
        _ => false,
    }
}

/// Like [`is_valid_name`], but reports [`Error::InvalidName`].
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Map an escape letter (the character after `\`) to what it stands for.
fn unescape_char(c: char) -> Option<char> {
    match c {
        't' => Some('\t'),
        'r' => Some('\r'),
        'n' => Some('\n'),
        '0' => Some('\0'),
        '#' => Some('#'),
        '}' => Some('}'),
        _ => None,
    }
}

fn needs_escape(c: char) -> bool {
    matches!(c, '\t' | '\r' | '\n' | '\0' | '#' | '}')
}

/// Escape a string for storage.
///
/// `#` and `}` are left bare when the output so far ends with a backslash,
/// so a literal `\#` in the input survives unchanged.
pub fn encode_str(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\0' => out.push_str("\\0"),
            '#' | '}' => {
                if !out.ends_with('\\') {
                    out.push('\\');
                }
                out.push(c);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape a single character for storage.
pub fn encode_char(c: char) -> String {
    match c {
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\n' => "\\n".to_string(),
        '\0' => "\\0".to_string(),
        '#' => "\\#".to_string(),
        '}' => "\\}".to_string(),
        c => c.to_string(),
    }
}

/// Format an integer for storage.
pub fn encode_int(n: i64) -> String {
    n.to_string()
}

/// Format a real for storage.
pub fn encode_real(n: f64) -> String {
    n.to_string()
}

/// Undo [`encode_str`].
pub fn decode_str(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied().and_then(unescape_char) {
            Some(decoded) => {
                chars.next();
                out.push(decoded);
            }
            // Unknown escape: keep the backslash, reprocess the next char.
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Read a raw value as an integer. The whole value must be consumed.
pub fn decode_int(raw: &str) -> std::result::Result<i64, ConversionError> {
    raw.trim_start_matches(|c: char| c.is_ascii_whitespace())
        .parse::<i64>()
        .map_err(|_| ConversionError::new(ScalarKind::Int, raw))
}

/// Read a raw value as a real. The whole value must be consumed.
pub fn decode_real(raw: &str) -> std::result::Result<f64, ConversionError> {
    let text = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());
    // `f64::from_str` also takes `inf` and `nan`, which are not numbers here.
    let numeric = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return Err(ConversionError::new(ScalarKind::Real, raw));
    }
    text.parse::<f64>()
        .map_err(|_| ConversionError::new(ScalarKind::Real, raw))
}

/// Read a raw value as a single character, either literal or escaped.
pub fn decode_char(raw: &str) -> std::result::Result<char, ConversionError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, _) => Ok(c),
        (Some('\\'), Some(e), None) => {
            unescape_char(e).ok_or_else(|| ConversionError::new(ScalarKind::Char, raw))
        }
        _ => Err(ConversionError::new(ScalarKind::Char, raw)),
    }
}
