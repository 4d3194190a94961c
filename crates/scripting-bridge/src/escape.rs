/// Escape a string for embedding inside a JXA (`osascript -l JavaScript`)
/// string literal. No caller string ever reaches a script unescaped
/// (spec.md §4.C4 "String embedding rule").
pub fn escape_js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Embed a string as a quoted JS literal, escaped per [`escape_js_string`].
pub fn js_literal(raw: &str) -> String {
    format!("\"{}\"", escape_js_string(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_backslash_quote_and_whitespace_controls() {
        let input = "say \"hi\"\\tab\nnewline";
        let escaped = escape_js_string(input);
        assert!(!escaped.contains('\n'));
        assert_eq!(
            escaped,
            "say \\\"hi\\\"\\\\tab\\nnewline"
        );
    }

    #[test]
    fn js_literal_wraps_in_quotes() {
        assert_eq!(js_literal("a\"b"), "\"a\\\"b\"");
    }
}
