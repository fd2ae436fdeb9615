//! Best-effort extraction of a JSON value embedded in free oracle text.
//!
//! Oracles wrap payloads in prose and markdown fences despite instructions.
//! Strategies, in order: direct parse, fence-stripped balanced-bracket scan,
//! first-to-last bracket slice. Isolated here so the scanner is unit-testable
//! without any networking.

use serde_json::Value;

/// Extracts the first structured value (object or array) from raw text.
/// Returns `None` when no strategy yields valid JSON.
pub fn parse_structured(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    // Strategy 1: the whole response is the payload.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_array() {
            return Some(value);
        }
    }

    // Strategy 2: strip code fences, then scan for the first balanced
    // object/array substring.
    let unfenced = strip_fences(trimmed);
    if let Some(candidate) = scan_balanced(unfenced) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some(value);
        }
    }

    // Strategy 3: crude first-open to last-close slice.
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (unfenced.find(open), unfenced.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&unfenced[start..=end]) {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Finds the first syntactically balanced `{…}` or `[…]` substring.
/// String- and escape-aware: brackets inside quoted strings do not affect
/// nesting depth.
pub fn scan_balanced(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let open = text[start..].chars().next()?;
    let close = if open == '{' { '}' } else { ']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips ```json … ``` or ``` … ``` fences, leaving inner text intact.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let stripped = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match stripped {
        Some(inner) => inner
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| inner.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse_object() {
        let value = parse_structured(r#"{"score": 8}"#).unwrap();
        assert_eq!(value, json!({"score": 8}));
    }

    #[test]
    fn test_direct_parse_array() {
        let value = parse_structured(r#"[1, 2, 3]"#).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_bare_scalar_is_not_structured() {
        assert!(parse_structured("42").is_none());
    }

    #[test]
    fn test_prose_wrapped_object() {
        let text = r#"Sure! Here is the evaluation you asked for:
            {"score": 7, "clarity": 6} Let me know if you need more."#;
        let value = parse_structured(text).unwrap();
        assert_eq!(value, json!({"score": 7, "clarity": 6}));
    }

    #[test]
    fn test_code_fence_wrapped_object() {
        let text = "```json\n{\"score\": 9}\n```";
        let value = parse_structured(text).unwrap();
        assert_eq!(value, json!({"score": 9}));
    }

    #[test]
    fn test_fence_and_prose_combined() {
        let text = "The result is below.\n```json\n{\"a\": [1, 2]}\n```\nHope that helps!";
        let value = parse_structured(text).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_braces_inside_strings_do_not_break_scan() {
        let text = r#"prefix {"note": "use {braces} carefully", "score": 5} suffix"#;
        let value = parse_structured(text).unwrap();
        assert_eq!(value["score"], 5);
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let text = r#"see {"quote": "he said \"hi\" {", "ok": true} done"#;
        let value = parse_structured(text).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_nested_objects_balance() {
        let text = r#"answer: {"outer": {"inner": [1, {"deep": 2}]}} trailing"#;
        let value = parse_structured(text).unwrap();
        assert_eq!(value["outer"]["inner"][1]["deep"], 2);
    }

    #[test]
    fn test_garbage_returns_none() {
        assert!(parse_structured("total nonsense, no json here").is_none());
        assert!(parse_structured("").is_none());
        assert!(parse_structured("{ broken: ").is_none());
    }

    #[test]
    fn test_scan_balanced_finds_first_value() {
        let text = r#"x {"a": 1} y {"b": 2}"#;
        assert_eq!(scan_balanced(text).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_scan_balanced_array() {
        let text = "values: [1, [2, 3]] rest";
        assert_eq!(scan_balanced(text).unwrap(), "[1, [2, 3]]");
    }
}
