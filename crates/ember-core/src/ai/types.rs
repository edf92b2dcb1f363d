//! Generation request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::Serialize;
use serde_json::{json, Value};

/// Schema name sent with `response_format`
pub const INSIGHT_SCHEMA_NAME: &str = "weekly_insight";

/// One schema-constrained generation call
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system: String,
    pub user: String,
    /// JSON schema the output must satisfy
    pub schema: Value,
}

/// What the provider handed back
///
/// Providers that honour structured output may return an already-parsed
/// object; everything else is raw text that still needs the response parser.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    Structured(Value),
    RawText(String),
}

/// Unvalidated provider output, for callers that need diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGeneration {
    /// Text as received (structured payloads are re-serialized)
    pub raw_text: Option<String>,
    /// Best-effort JSON value, not checked against the schema
    pub parsed: Option<Value>,
}

/// JSON schema requiring exactly the six insight fields
pub fn insight_schema() -> Value {
    let string_list = json!({
        "type": "array",
        "items": { "type": "string" }
    });

    json!({
        "type": "object",
        "properties": {
            "howYouFelt": { "type": "string" },
            "weeklySummary": { "type": "string" },
            "moodDrivers": string_list,
            "patterns": string_list,
            "suggestions": string_list,
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
        },
        "required": [
            "howYouFelt",
            "weeklySummary",
            "moodDrivers",
            "patterns",
            "suggestions",
            "confidence"
        ],
        "additionalProperties": false
    })
}
