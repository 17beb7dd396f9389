use crate::error::LiteralError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n'  => Some('\n'),
        'r'  => Some('\r'),
        't'  => Some('\t'),
        'f'  => Some('\u{0c}'),
        'b'  => Some('\u{08}'),
        '\\' => Some('\\'),
        '"'  => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

fn strip_quotes(image: &str, quote: char) -> &str {
    if image.len() >= 2 && image.starts_with(quote) && image.ends_with(quote) {
        &image[1..image.len() - 1]
    } else {
        image
    }
}

/// Strips surrounding double quotes and resolves escape sequences.
pub fn parse_string_literal(image: &str) -> Result<String, LiteralError> {
    let body = strip_quotes(image, '"');
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(esc) => match unescape(esc) {
                Some(resolved) => out.push(resolved),
                None => {
                    return Err(LiteralError::Format(format!(
                        "Invalid string literal (unsupported escape sequence \\{}): {}",
                        esc, image
                    )))
                }
            },
            None => {
                return Err(LiteralError::Format(format!(
                    "Invalid string literal (trailing \\): {}",
                    image
                )))
            }
        }
    }
    Ok(out)
}

/// Strips surrounding single quotes; the remainder must be exactly one
/// character or one escape sequence.
pub fn parse_char_literal(image: &str) -> Result<char, LiteralError> {
    let body = strip_quotes(image, '\'');
    let mut chars = body.chars();
    let parsed = match (chars.next(), chars.next(), chars.next()) {
        (Some('\\'), Some(esc), None) => unescape(esc),
        (Some(c), None, None) if c != '\\' => Some(c),
        _ => None,
    };
    parsed.ok_or_else(|| LiteralError::Format(format!("Invalid char literal: {}", image)))
}

/// `Some(digits)` when `image` is a `0x`/`0X` hex literal.
fn hex_digits(image: &str) -> Option<&str> {
    if image.len() > 2 && image.starts_with('0') && matches!(image.as_bytes()[1], b'x' | b'X') {
        Some(&image[2..])
    } else {
        None
    }
}

fn format_error(image: &str) -> LiteralError {
    LiteralError::Format(format!("Invalid integer literal: {}", image))
}

fn range_error(image: &str, ty: &str) -> LiteralError {
    LiteralError::Range(format!("Value out of range of {} ({})", ty, image))
}

/// Hex digits read at twice the target width, so anything up to the
/// unsigned maximum narrows with wraparound and anything above is a range
/// error rather than a format error.
macro_rules! int_literal_parser {
    ($name:ident, $ty:ty, $wide:ty, $unsigned_max:expr, $label:expr) => {
        pub fn $name(image: &str) -> Result<$ty, LiteralError> {
            if image == "0" {
                return Ok(0);
            }
            if let Some(digits) = hex_digits(image) {
                if digits.starts_with(['+', '-']) {
                    return Err(format_error(image));
                }
                let value = <$wide>::from_str_radix(digits, 16).map_err(|e| {
                    match e.kind() {
                        std::num::IntErrorKind::PosOverflow => range_error(image, $label),
                        _ => format_error(image),
                    }
                })?;
                if value > $unsigned_max {
                    return Err(range_error(image, $label));
                }
                return Ok(value as $ty);
            }
            image.parse::<$ty>().map_err(|e| match e.kind() {
                std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
                    range_error(image, $label)
                }
                _ => format_error(image),
            })
        }
    };
}

int_literal_parser!(parse_byte_literal, i8, i16, 0xff, "byte");
int_literal_parser!(parse_short_literal, i16, i32, 0xffff, "short");
int_literal_parser!(parse_int_literal, i32, i64, 0xffff_ffff, "int");
int_literal_parser!(parse_long_literal, i64, i128, 0xffff_ffff_ffff_ffff_i128, "long");

/// Extracts the lines of a `/** ... */` comment. Other comments, and doc
/// comments with nothing but whitespace in them, yield `None`.
pub fn parse_doc_comments(image: &str) -> Option<Vec<String>> {
    if !image.starts_with("/**") {
        return None;
    }
    let mut lines: Vec<String> = image
        .lines()
        .map(|line| {
            let mut line = line.trim();
            if let Some(rest) = line.strip_prefix("/*") {
                line = rest;
            }
            while line.starts_with('*') && !line.starts_with("*/") {
                line = &line[1..];
            }
            if let Some(rest) = line.strip_suffix("*/") {
                line = rest;
            }
            line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
        })
        .collect();

    while lines.first().map_or(false, |l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse_string_literal(r#""a\tb\n\"c\"""#).unwrap(), "a\tb\n\"c\"");
        assert_eq!(parse_string_literal(r#""\\\'""#).unwrap(), "\\'");
        assert!(matches!(parse_string_literal(r#""bad\q""#), Err(LiteralError::Format(_))));
        assert!(parse_string_literal(r#"trailing\"#).is_err());
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(parse_char_literal("'a'").unwrap(), 'a');
        assert_eq!(parse_char_literal(r"'\n'").unwrap(), '\n');
        assert!(parse_char_literal("'ab'").is_err());
        assert!(parse_char_literal("''").is_err());
        assert!(parse_char_literal(r"'\z'").is_err());
    }

    #[test]
    fn test_integer_literals() {
        assert_eq!(parse_int_literal("0").unwrap(), 0);
        assert_eq!(parse_int_literal("-42").unwrap(), -42);
        assert_eq!(parse_byte_literal("0x7f").unwrap(), 127);
        assert_eq!(parse_byte_literal("0xff").unwrap(), -1);
        assert!(matches!(parse_byte_literal("0x100"), Err(LiteralError::Range(_))));
        assert!(matches!(parse_byte_literal("128"), Err(LiteralError::Range(_))));
        assert_eq!(parse_short_literal("0XFFFF").unwrap(), -1);
        assert_eq!(parse_int_literal("0xffffffff").unwrap(), -1);
        assert!(matches!(parse_int_literal("0x1ffffffff"), Err(LiteralError::Range(_))));
        assert_eq!(parse_long_literal("0xffffffffffffffff").unwrap(), -1);
        assert_eq!(parse_long_literal("9223372036854775807").unwrap(), i64::MAX);
        assert!(matches!(parse_long_literal("9223372036854775808"), Err(LiteralError::Range(_))));
        assert!(matches!(parse_int_literal("12a"), Err(LiteralError::Format(_))));
        assert!(matches!(parse_int_literal("0xzz"), Err(LiteralError::Format(_))));
    }

    #[test]
    fn test_doc_comment_lines() {
        assert_eq!(
            parse_doc_comments("/** line1\n * line2\n */"),
            Some(vec!["line1".to_string(), "line2".to_string()])
        );
        assert_eq!(
            parse_doc_comments("/**\n *\n * Only line.\n *\n */"),
            Some(vec!["Only line.".to_string()])
        );
        assert_eq!(parse_doc_comments("/*  not docs */"), None);
        assert_eq!(parse_doc_comments("/** */"), None);
        assert_eq!(parse_doc_comments("/**   \n   */"), None);
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("a\"b"), r#""a\"b""#);
    }
}
