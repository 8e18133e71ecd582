//! Comment-aware JSON sanitizing.
//!
//! Config files in the wild are JSON with C-style comments. Comments are
//! stripped by a single pass that tracks whether it is inside a string, so
//! `"http://x"` or `"/* not a comment */"` survive untouched.

use crate::discovery::read_text;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Strip `//` line comments and `/* */` block comments outside strings.
///
/// The newline ending a line comment is kept. An unterminated block comment
/// runs to the end of the input.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Sanitize and parse; malformed input yields `None`.
pub fn parse_json(text: &str) -> Option<Value> {
    match serde_json::from_str(&sanitize(text)) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Unparseable JSON: {}", e);
            None
        }
    }
}

/// Read a file and parse it as commented JSON.
pub fn read_json_file(path: &Path) -> Option<Value> {
    let text = read_text(path)?;
    let value = parse_json(&text);
    if value.is_none() {
        debug!("Skipping malformed JSON file: {}", path.display());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_is_unchanged() {
        let text = "{\n  \"a\": [1, 2, 3],\n  \"b\": {\"c\": null}\n}";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_slashes_inside_strings_survive() {
        let text = r#"{"a":"http://x"}"#;
        assert_eq!(sanitize(text), text);

        let text = r#"{"a":"/* keep */", 'b': '// keep'}"#;
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let text = r#"{"a":"say \"//hi\""} // trailing"#;
        assert_eq!(sanitize(text), r#"{"a":"say \"//hi\""} "#);
    }

    #[test]
    fn test_line_comment_keeps_newline() {
        let text = "{ // note\n\"a\": 1 }";
        assert_eq!(sanitize(text), "{ \n\"a\": 1 }");
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(sanitize("[1, /* two */ 3]"), "[1,  3]");
        assert_eq!(sanitize("[1] /* never closed"), "[1] ");
        assert_eq!(sanitize("[1 /*/ still comment */]"), "[1 ]");
    }

    #[test]
    fn test_parse_json() {
        let value = parse_json("{\n  // comment\n  \"count\": 2 /* inline */\n}").unwrap();
        assert_eq!(value, json!({"count": 2}));

        assert!(parse_json("{ not json").is_none());
    }

    #[test]
    fn test_read_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thing.config");
        std::fs::write(&path, "/* header */ {\"x\": true}").unwrap();

        assert_eq!(read_json_file(&path), Some(json!({"x": true})));
        assert!(read_json_file(&dir.path().join("missing.config")).is_none());
    }
}
