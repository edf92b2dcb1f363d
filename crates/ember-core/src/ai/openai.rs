//! OpenAI chat-completions backend
//!
//! Sends the rendered prompt with a strict `json_schema` response format so
//! the provider constrains output to the insight shape. Any server speaking
//! the same API (vLLM, llama-server, LocalAI) works via `generation.base_url`.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::classify::ProviderError;
use super::types::{GenerationOutput, GenerationRequest, INSIGHT_SCHEMA_NAME};
use super::{GenerationBackend, ProviderResult};

/// OpenAI-compatible backend
///
/// The credential is supplied per call, never stored on the backend. There is
/// no client-side timeout or retry; callers own both.
#[derive(Clone)]
pub struct OpenAIBackend {
    http_client: Client,
    base_url: String,
}

impl OpenAIBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_body(request: &GenerationRequest) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: INSIGHT_SCHEMA_NAME,
                    strict: true,
                    schema: &request.schema,
                },
            },
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> ProviderResult<Option<GenerationOutput>> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let started = Instant::now();

        debug!(model = %request.model, host = %self.base_url, "Requesting weekly insight");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(credential)
            .json(&Self::build_body(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        debug!(
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Insight response received"
        );

        if !status.is_success() {
            return Err(ProviderError::from_response(status.as_u16(), &text));
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
                message: format!("Unreadable completion response: {}", e),
                body: text.clone(),
            })?;

        let Some(choice) = completion.choices.into_iter().next() else {
            return Ok(None);
        };
        let message = choice.message;

        if let Some(parsed) = message.parsed {
            return Ok(Some(GenerationOutput::Structured(parsed)));
        }
        if let Some(content) = message.content.filter(|c| !c.trim().is_empty()) {
            return Ok(Some(GenerationOutput::RawText(content)));
        }
        if let Some(refusal) = message.refusal {
            warn!("Model refused the insight request");
            return Ok(Some(GenerationOutput::RawText(refusal)));
        }

        Ok(None)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'static str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    parsed: Option<Value>,
    #[serde(default)]
    refusal: Option<String>,
}
