//! JSON parsing helpers for model responses
//!
//! Models asked for "only JSON" still wrap it in code fences or add prose
//! around it. Parsing tries the cleaned text first, then the widest
//! `{ ... }` span, and only then gives up with the original text attached.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::InsightResult;

fn re_fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^```(?:json)?\s*").expect("valid regex"))
}

fn re_fence_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*```$").expect("valid regex"))
}

/// Remove a surrounding ``` fence (optionally tagged `json`)
pub fn strip_code_fence(text: &str) -> String {
    let text = re_fence_open().replace(text, "");
    re_fence_close().replace(&text, "").into_owned()
}

/// Parse the JSON value contained in a model response
///
/// On failure the error carries `raw` untouched so callers can log exactly
/// what the provider sent.
pub fn extract_json_value(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fence(raw.trim());

    let direct_err = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    // Greedy span: first '{' through last '}'
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(s), Some(e)) if s < e => serde_json::from_str(&cleaned[s..=e])
            .map_err(|err| Error::parse(raw, format!("Invalid JSON from AI: {}", err))),
        _ => Err(Error::parse(
            raw,
            format!("No JSON object found in AI response: {}", direct_err),
        )),
    }
}

/// Build an insight from a parsed value, applying defaults for absent fields
///
/// Non-object values behave as if every field were absent.
pub fn insight_from_value(value: &Value) -> InsightResult {
    InsightResult {
        how_you_felt: text_field(value.get("howYouFelt")).trim().to_string(),
        weekly_summary: text_field(value.get("weeklySummary")),
        mood_drivers: list_field(value.get("moodDrivers")),
        patterns: list_field(value.get("patterns")),
        suggestions: list_field(value.get("suggestions")),
        confidence: value
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(InsightResult::DEFAULT_CONFIDENCE),
    }
}

/// Parse a raw model response into an insight
pub fn parse_insight(raw: &str) -> Result<InsightResult> {
    let value = extract_json_value(raw)?;
    Ok(insight_from_value(&value))
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn list_field(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_result() -> InsightResult {
        InsightResult {
            how_you_felt: "You felt mostly calm, with a dip midweek.".into(),
            weekly_summary: "Work took up a lot of space this week.".into(),
            mood_drivers: vec!["Deadlines".into(), "Evening walks".into()],
            patterns: vec!["You write most on Tuesdays".into()],
            suggestions: vec!["Keep the walks going".into()],
            confidence: 0.85,
        }
    }

    #[test]
    fn test_round_trip() {
        let original = full_result();
        let raw = serde_json::to_string(&original).unwrap();
        assert_eq!(parse_insight(&raw).unwrap(), original);
    }

    #[test]
    fn test_round_trip_with_empty_lists() {
        let original = InsightResult {
            how_you_felt: "Quiet week.".into(),
            confidence: 0.2,
            ..Default::default()
        };
        let raw = serde_json::to_string_pretty(&original).unwrap();
        assert_eq!(parse_insight(&raw).unwrap(), original);
    }

    #[test]
    fn test_fenced_with_json_tag() {
        let raw = format!(
            "```json\n{}\n```",
            serde_json::to_string(&full_result()).unwrap()
        );
        assert_eq!(parse_insight(&raw).unwrap(), full_result());
    }

    #[test]
    fn test_fenced_without_tag() {
        let raw = format!("```\n{}\n```", serde_json::to_string(&full_result()).unwrap());
        assert_eq!(parse_insight(&raw).unwrap(), full_result());
    }

    #[test]
    fn test_surrounding_prose_uses_brace_span() {
        let raw = r#"Here's your weekly insight:
{"howYouFelt": "Steady.", "weeklySummary": "A balanced week.", "moodDrivers": [], "patterns": [], "suggestions": [], "confidence": 0.7}
Hope this helps!"#;
        let result = parse_insight(raw).unwrap();
        assert_eq!(result.how_you_felt, "Steady.");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_missing_lists_and_confidence_default() {
        let raw = r#"{"howYouFelt": "  Tired but hopeful.  ", "weeklySummary": "Short week."}"#;
        let result = parse_insight(raw).unwrap();

        assert_eq!(result.how_you_felt, "Tired but hopeful.");
        assert!(result.mood_drivers.is_empty());
        assert!(result.patterns.is_empty());
        assert!(result.suggestions.is_empty());
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let raw = r#"{"howYouFelt": null, "moodDrivers": "work", "patterns": {"a": 1}, "suggestions": ["rest", 3, null], "confidence": "high"}"#;
        let result = parse_insight(raw).unwrap();

        assert_eq!(result.how_you_felt, "");
        assert_eq!(result.weekly_summary, "");
        assert!(result.mood_drivers.is_empty());
        assert!(result.patterns.is_empty());
        assert_eq!(result.suggestions, vec!["rest".to_string(), "3".to_string()]);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_out_of_range_confidence_not_clamped() {
        let raw = r#"{"howYouFelt": "x", "confidence": 1.7}"#;
        let result = parse_insight(raw).unwrap();
        assert_eq!(result.confidence, 1.7);
        assert!(!result.confidence_in_range());
    }

    #[test]
    fn test_plain_prose_is_parse_error_with_raw_text() {
        let raw = "  I'm sorry, I can't help with that right now.  ";
        match parse_insight(raw) {
            Err(Error::Parse { raw: kept, message }) => {
                assert_eq!(kept, raw);
                assert!(!message.is_empty());
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_brace_span_is_parse_error() {
        let raw = "```json\n{\"howYouFelt\": \"cut off\", \"patterns\": [\n```";
        match parse_insight(raw) {
            Err(Error::Parse { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_is_parse_error() {
        assert!(matches!(parse_insight("   "), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```JSON\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_fence_regexes_compiled_once() {
        assert!(std::ptr::eq(re_fence_open(), re_fence_open()));
        assert!(std::ptr::eq(re_fence_close(), re_fence_close()));

        // Reused patterns still handle repeated inputs
        for _ in 0..3 {
            assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        }
    }
}
