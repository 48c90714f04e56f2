// src/analyze/sanitize.rs
//! Pull a JSON object out of free-form model output.

use once_cell::sync::OnceCell;
use regex::Regex;

const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Strip code fences anywhere in `raw`, then return the greedy `{ ... }` span.
///
/// Falls back to the fence-stripped text when no braces are found. JSON
/// validity is left to the caller.
pub fn extract_json_object(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in FENCE_MARKERS {
        text = text.replace(marker, "");
    }

    static RE_OBJECT: OnceCell<Regex> = OnceCell::new();
    let re = RE_OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

    match re.find(&text) {
        Some(m) => m.as_str().to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_with_prose_is_isolated() {
        let raw = "Sure!\n```json\n{\"a\":1}\n```\nThanks";
        assert_eq!(extract_json_object(raw), r#"{"a":1}"#);
    }

    #[test]
    fn span_is_greedy_across_nested_objects() {
        let raw = r#"x {"a":{"b":2}} y"#;
        assert_eq!(extract_json_object(raw), r#"{"a":{"b":2}}"#);
    }

    #[test]
    fn no_braces_returns_stripped_text() {
        assert_eq!(extract_json_object("```json\nnope\n```"), "\nnope\n");
    }
}
