//! Extraction of a JSON value from a free-text model reply.
//!
//! 1. strip a leading code fence (with optional language tag) and a trailing
//!    fence
//! 2. take the span from the first opening bracket to the last closing
//!    bracket of the same kind; no brace counting
//! 3. strict JSON parse of that span
//!
//! Any failure yields `None`. Callers report it as a parse failure and never
//! surface the raw text.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::kind::ReplyShape;

/// Remove a surrounding markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let mut cleaned = text.trim();

    if let Some(rest) = cleaned.strip_prefix("```") {
        // Drop the language tag up to the end of the opening line
        cleaned = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    if let Some(rest) = cleaned.trim_end().strip_suffix("```") {
        cleaned = rest;
    }

    cleaned.trim()
}

/// The greedy bracket span of the requested shape.
pub fn bracket_span(text: &str, shape: ReplyShape) -> Option<&str> {
    let (open, close) = shape.brackets();
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Extract a JSON value of the requested shape.
pub fn extract_json(raw: &str, shape: ReplyShape) -> Option<Value> {
    let span = bracket_span(strip_code_fence(raw), shape)?;
    serde_json::from_str(span).ok()
}

/// Extract and deserialize into `T`.
pub fn extract<T: DeserializeOwned>(raw: &str, shape: ReplyShape) -> Option<T> {
    extract_json(raw, shape).and_then(|value| serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_is_parsed_as_is() {
        let text = r#"{"suggestions": ["a", "b"]}"#;
        assert_eq!(
            extract_json(text, ReplyShape::Object),
            serde_json::from_str::<Value>(text).ok()
        );
    }

    #[test]
    fn test_fenced_equals_unfenced() {
        let inner = r#"{"content": "x", "suggestions": []}"#;
        let fenced = format!("```json\n{}\n```", inner);
        let bare_fence = format!("```\n{}\n```", inner);
        assert_eq!(
            extract_json(&fenced, ReplyShape::Object),
            extract_json(inner, ReplyShape::Object)
        );
        assert_eq!(
            extract_json(&bare_fence, ReplyShape::Object),
            extract_json(inner, ReplyShape::Object)
        );
    }

    #[test]
    fn test_prose_around_json() {
        let text = "Here you go:\n[{\"question\": \"Why?\"}]\nHope this helps!";
        assert_eq!(
            extract_json(text, ReplyShape::Array),
            Some(json!([{ "question": "Why?" }]))
        );
    }

    #[test]
    fn test_no_brackets_fails() {
        let text = "Sure! Here's my analysis: the answer is 42.";
        assert!(extract_json(text, ReplyShape::Object).is_none());
        assert!(extract_json(text, ReplyShape::Array).is_none());
    }

    #[test]
    fn test_greedy_span_fails_on_trailing_braces() {
        // The span runs to the last closing brace, which is not valid JSON
        let text = r#"{"a": 1} and also {not json}"#;
        assert!(extract_json(text, ReplyShape::Object).is_none());
    }

    #[test]
    fn test_reversed_brackets_fail() {
        assert!(bracket_span("} oops {", ReplyShape::Object).is_none());
    }

    #[test]
    fn test_typed_extract_rejects_wrong_shape() {
        #[derive(serde::Deserialize)]
        struct Suggestions {
            #[allow(dead_code)]
            suggestions: Vec<String>,
        }
        assert!(extract::<Suggestions>(r#"{"suggestions": [1, 2]}"#, ReplyShape::Object).is_none());
        assert!(extract::<Suggestions>(r#"{"suggestions": ["ok"]}"#, ReplyShape::Object).is_some());
    }
}
