//! Normalizes raw, possibly quoted or backslash-escaped SVG text into parseable markup.
//!
//! SVG copied out of source code often arrives as a string literal: wrapped in quotes,
//! with `\"` around attribute values and `\n` where the original had line breaks.
//! [`clean_svg_string`] undoes that so the result can be handed to the XML parser.

/// Cleans a raw SVG text blob.
///
/// Rules, applied in order, each over the whole string:
/// 1. Trim surrounding whitespace.
/// 2. Strip one outer pair of matching `"` or `'` quotes.
/// 3. Delete the literal two-character sequences `\n`, `\r` and `\t`.
/// 4. Unescape `\"` and `\'`.
/// 5. Drop the backslash in front of any other character, except a backslash.
/// 6. Drop a single trailing backslash.
/// 7. Collapse whitespace runs into one space.
/// 8. Trim again.
///
/// Never fails; empty input yields an empty string.
pub fn clean_svg_string(raw: &str) -> String {
    let mut s = raw.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return String::new();
    }

    // A lone quote character both starts and ends the string; stripping it leaves nothing.
    if (s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')) {
        s = s.get(1..s.len().saturating_sub(1)).unwrap_or("");
    }

    let s = s.replace("\\n", "").replace("\\r", "").replace("\\t", "");
    let s = s.replace("\\\"", "\"").replace("\\'", "'");
    let mut s = drop_redundant_backslashes(&s);
    if s.ends_with('\\') {
        s.pop();
    }

    collapse_whitespace(&s)
}

/// Removes the backslash from `\x` pairs where `x` is not one of `n r t " ' \`.
///
/// Scans left to right without overlap: a consumed pair is never re-examined, and a
/// backslash that does not start a pair is kept and scanning resumes at the next char.
fn drop_redundant_backslashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if !matches!(next, 'n' | 'r' | 't' | '"' | '\'' | '\\') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// True when `raw` holds nothing but whitespace (byte-order marks included), i.e. when
/// there is no input to process at all.
pub fn is_blank(raw: &str) -> bool {
    raw.chars().all(is_js_whitespace)
}

/// Collapses every run of whitespace into a single space and trims the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split(is_js_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace as browsers see it when trimming pasted text, byte-order mark included.
fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}
