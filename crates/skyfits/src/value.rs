//! Header value text: comment splitting, quote handling, and typed parsing.

use alloc::string::String;

/// Split the text after a value indicator at the first `/` that is not inside
/// a quoted string.
///
/// Returns `(value_part, optional_comment)`. The comment has the separator
/// and one optional leading space removed and trailing spaces trimmed; an
/// empty comment is reported as `None`. Doubled quotes (`''`) toggle the
/// quote state twice, so they never end a string early.
pub fn split_comment(field: &str) -> (&str, Option<&str>) {
    let mut in_quote = false;
    for (i, ch) in field.char_indices() {
        match ch {
            '\'' => in_quote = !in_quote,
            '/' if !in_quote => {
                let value = &field[..i];
                let rest = &field[i + 1..];
                let rest = rest.strip_prefix(' ').unwrap_or(rest);
                let comment = rest.trim_end();
                return (value, (!comment.is_empty()).then_some(comment));
            }
            _ => {}
        }
    }
    (field, None)
}

/// Strip surrounding quotes from a trimmed value and unescape doubled quotes.
///
/// Returns the value text and whether it was a quoted string. Trailing spaces
/// inside the quotes are insignificant in FITS and are removed; leading spaces
/// are kept. An unterminated string is accepted up to the end of the text.
pub fn unquote(value: &str) -> (String, bool) {
    let value = value.trim();
    let Some(inner) = value.strip_prefix('\'') else {
        return (String::from(value), false);
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                out.push('\'');
                chars.next();
            } else {
                break;
            }
        } else {
            out.push(ch);
        }
    }
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    (out, true)
}

/// Quote a string for a FITS value field, doubling embedded quotes and padding
/// the content to the 8-character minimum.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    while out.len() < 9 {
        out.push(' ');
    }
    out.push('\'');
    out
}

/// Parse an integer value.
pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    text.parse::<i64>().ok()
}

/// Parse a real value, accepting FITS `D` exponents and integer text.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.contains(['D', 'd']) {
        let normalized = text.replace(['D', 'd'], "E");
        return normalized.parse::<f64>().ok();
    }
    text.parse::<f64>().ok()
}

/// Parse a FITS logical (`T` or `F`).
pub fn parse_logical(text: &str) -> Option<bool> {
    match text.trim() {
        "T" => Some(true),
        "F" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_integer_with_comment() {
        let (v, c) = split_comment("                 1024 / comment");
        assert_eq!(v.trim(), "1024");
        assert_eq!(c, Some("comment"));
    }

    #[test]
    fn split_without_space_after_slash() {
        let (v, c) = split_comment(" -32 /No. of bits per pixel");
        assert_eq!(v.trim(), "-32");
        assert_eq!(c, Some("No. of bits per pixel"));
    }

    #[test]
    fn split_ignores_slash_inside_quotes() {
        let (v, c) = split_comment(" '2024/01/15' / observation date");
        assert_eq!(v.trim(), "'2024/01/15'");
        assert_eq!(c, Some("observation date"));
    }

    #[test]
    fn split_escaped_quote_keeps_string_open() {
        let (v, c) = split_comment(" 'it''s / fine' / note");
        assert_eq!(v.trim(), "'it''s / fine'");
        assert_eq!(c, Some("note"));
    }

    #[test]
    fn split_empty_comment_is_none() {
        let (v, c) = split_comment(" 5 /   ");
        assert_eq!(v.trim(), "5");
        assert!(c.is_none());
    }

    #[test]
    fn split_no_comment() {
        let (v, c) = split_comment("   T");
        assert_eq!(v, "   T");
        assert!(c.is_none());
    }

    #[test]
    fn unquote_strips_and_trims() {
        assert_eq!(unquote(" 'Hubble  ' "), (String::from("Hubble"), true));
    }

    #[test]
    fn unquote_doubled_quotes() {
        assert_eq!(unquote("'it''s ok '"), (String::from("it's ok"), true));
    }

    #[test]
    fn unquote_keeps_leading_spaces() {
        assert_eq!(unquote("'  M31'"), (String::from("  M31"), true));
    }

    #[test]
    fn unquote_unterminated() {
        assert_eq!(unquote("'open ended"), (String::from("open ended"), true));
    }

    #[test]
    fn unquote_plain_number() {
        assert_eq!(unquote("  42 "), (String::from("42"), false));
    }

    #[test]
    fn quote_pads_to_eight() {
        assert_eq!(quote("M31"), "'M31     '");
        assert_eq!(quote("it's"), "'it''s   '");
        assert_eq!(quote("LONGER THAN EIGHT"), "'LONGER THAN EIGHT'");
    }

    #[test]
    fn quote_then_unquote() {
        let (text, quoted) = unquote(&quote("O'Brien"));
        assert!(quoted);
        assert_eq!(text, "O'Brien");
    }

    #[test]
    fn integers() {
        assert_eq!(parse_integer("1024"), Some(1024));
        assert_eq!(parse_integer("-32"), Some(-32));
        assert_eq!(parse_integer("+8"), Some(8));
        assert_eq!(parse_integer("1.5"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("2.5"), Some(2.5));
        assert_eq!(parse_float("32768"), Some(32768.0));
        assert_eq!(parse_float("1.0D+02"), Some(100.0));
        assert_eq!(parse_float("-2.7315E+02"), Some(-273.15));
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float("  "), None);
    }

    #[test]
    fn logicals() {
        assert_eq!(parse_logical("T"), Some(true));
        assert_eq!(parse_logical(" F "), Some(false));
        assert_eq!(parse_logical("X"), None);
    }
}
