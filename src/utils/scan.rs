//! Balanced-delimiter scanning for embedded JSON and script objects

/// Isolate the balanced block that opens at byte offset `start`.
///
/// The byte at `start` must be `{`, `[` or `(`. Quoted strings (`"`, `'` and
/// backtick) are skipped with backslash escapes honoured, so delimiters inside
/// string literals do not count. Returns `None` when `start` is not an opening
/// delimiter or the block never closes.
pub fn balanced_block(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let open = *bytes.get(start)?;
    let close = match open {
        b'{' => b'}',
        b'[' => b']',
        b'(' => b')',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    // Delimiters are ASCII, so `i` is a char boundary.
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Find `anchor` in `text` and isolate the balanced block that follows it.
///
/// Only whitespace may sit between the anchor and the opening brace.
pub fn block_after<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    let anchor_end = text.find(anchor)? + anchor.len();
    let rest = &text[anchor_end..];
    let offset = rest.len() - rest.trim_start().len();
    balanced_block(text, anchor_end + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_block_nested() {
        let text = r#"x = {"a":{"b":[1,2]},"c":3}; more"#;
        assert_eq!(
            balanced_block(text, 4),
            Some(r#"{"a":{"b":[1,2]},"c":3}"#)
        );
    }

    #[test]
    fn test_balanced_block_ignores_braces_in_strings() {
        let text = r#"{"a":"}}}","b":'{',"c":"\"}"}tail"#;
        assert_eq!(
            balanced_block(text, 0),
            Some(r#"{"a":"}}}","b":'{',"c":"\"}"}"#)
        );
    }

    #[test]
    fn test_balanced_block_other_delimiters() {
        assert_eq!(balanced_block("f(a,(b))c", 1), Some("(a,(b))"));
        assert_eq!(balanced_block("[[1],[2]],", 0), Some("[[1],[2]]"));
    }

    #[test]
    fn test_balanced_block_rejects_bad_start() {
        assert_eq!(balanced_block("abc{}", 0), None);
        assert_eq!(balanced_block("{}", 5), None);
    }

    #[test]
    fn test_balanced_block_unterminated() {
        assert_eq!(balanced_block(r#"{"a":{"b":1}"#, 0), None);
        assert_eq!(balanced_block(r#"{"a":"}"#, 0), None);
    }

    #[test]
    fn test_block_after_anchor() {
        let text = "var cfg =   {\"k\":{}};</script>";
        assert_eq!(block_after(text, "cfg ="), Some("{\"k\":{}}"));
        assert_eq!(block_after(text, "missing ="), None);
        assert_eq!(block_after("cfg = [1]", "cfg ="), Some("[1]"));
        assert_eq!(block_after("cfg = 1", "cfg ="), None);
    }

    #[test]
    fn test_balanced_block_multibyte_text() {
        let text = "{\"title\":\"Пример }\"}";
        assert_eq!(balanced_block(text, 0), Some(text));
    }
}
