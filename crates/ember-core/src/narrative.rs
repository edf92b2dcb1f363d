//! Narrative generation client
//!
//! Wraps a backend with the shared config: renders the prompt, attaches the
//! response schema, checks the credential, and turns whatever comes back into
//! an [`InsightResult`] or one of the crate's error kinds.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ai::parsing::{extract_json_value, insight_from_value, parse_insight};
use crate::ai::{
    classify, insight_schema, AIClient, GenerationBackend, GenerationOutput, GenerationRequest,
    RawGeneration,
};
use crate::config::InsightConfig;
use crate::error::{Error, Result};
use crate::models::{InsightInput, InsightResult};
use crate::prompts::{PromptBuilder, SMALL_SAMPLE_DISCLAIMER};

const EMPTY_OUTPUT: &str = "Model returned empty output";

/// Generates weekly narratives through a configured backend
#[derive(Clone)]
pub struct NarrativeClient {
    config: Arc<InsightConfig>,
    backend: AIClient,
}

impl NarrativeClient {
    pub fn new(config: Arc<InsightConfig>, backend: AIClient) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn backend(&self) -> &AIClient {
        &self.backend
    }

    /// Request sent for `input`, without calling the provider
    pub fn build_request(&self, input: &InsightInput) -> Result<GenerationRequest> {
        let rendered = PromptBuilder::new(&self.config.prompt).build(input)?;
        let generation = &self.config.generation;

        Ok(GenerationRequest {
            model: generation.model.clone(),
            temperature: generation.temperature,
            max_output_tokens: generation.max_output_tokens,
            system: rendered.system,
            user: rendered.user,
            schema: insight_schema(),
        })
    }

    /// Generate and validate a weekly insight
    ///
    /// A missing or blank credential fails with [`Error::Config`] before any
    /// network call. When `input` carries a limited-data note, `howYouFelt`
    /// always opens with [`SMALL_SAMPLE_DISCLAIMER`].
    pub async fn generate_insight(
        &self,
        input: &InsightInput,
        credential: Option<&str>,
    ) -> Result<InsightResult> {
        let mut result = match self.call(input, credential).await? {
            Some(GenerationOutput::Structured(value)) => insight_from_value(&value),
            Some(GenerationOutput::RawText(text)) if !text.trim().is_empty() => {
                parse_insight(&text)?
            }
            Some(GenerationOutput::RawText(text)) => return Err(Error::parse(text, EMPTY_OUTPUT)),
            None => return Err(Error::parse("", EMPTY_OUTPUT)),
        };

        if input.limited_data_note.is_some() {
            ensure_disclaimer(&mut result);
        }

        if !result.confidence_in_range() {
            warn!(
                confidence = result.confidence,
                "Model confidence outside 0..=1, keeping as returned"
            );
        }

        info!(
            entries = input.entry_count,
            confidence = result.confidence,
            "Weekly insight generated"
        );
        Ok(result)
    }

    /// Provider output without schema validation, for diagnostics
    ///
    /// Text that holds no JSON still comes back with `parsed: None`; only
    /// empty output is an error.
    pub async fn generate_raw(
        &self,
        input: &InsightInput,
        credential: Option<&str>,
    ) -> Result<RawGeneration> {
        match self.call(input, credential).await? {
            Some(GenerationOutput::Structured(value)) => Ok(RawGeneration {
                raw_text: Some(value.to_string()),
                parsed: Some(value),
            }),
            Some(GenerationOutput::RawText(text)) if !text.trim().is_empty() => {
                let parsed = extract_json_value(&text).ok();
                Ok(RawGeneration {
                    raw_text: Some(text),
                    parsed,
                })
            }
            Some(GenerationOutput::RawText(text)) => Err(Error::parse(text, EMPTY_OUTPUT)),
            None => Err(Error::parse("", EMPTY_OUTPUT)),
        }
    }

    async fn call(
        &self,
        input: &InsightInput,
        credential: Option<&str>,
    ) -> Result<Option<GenerationOutput>> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Config("No API credential configured for insights".into()))?;

        let request = self.build_request(input)?;

        debug!(
            backend = self.backend.name(),
            host = self.backend.host(),
            model = %request.model,
            "Calling narrative backend"
        );

        self.backend
            .generate(credential, &request)
            .await
            .map_err(|err| {
                let err = classify(err);
                warn!(error = %err, status = ?err.status(), "Narrative generation failed");
                err
            })
    }
}

/// Prefix `howYouFelt` with the small-sample disclaimer unless it already leads
fn ensure_disclaimer(result: &mut InsightResult) {
    if result.how_you_felt.starts_with(SMALL_SAMPLE_DISCLAIMER) {
        return;
    }

    debug!("Model omitted the small-sample disclaimer, prepending it");
    result.how_you_felt = if result.how_you_felt.is_empty() {
        SMALL_SAMPLE_DISCLAIMER.to_string()
    } else {
        format!("{} {}", SMALL_SAMPLE_DISCLAIMER, result.how_you_felt)
    };
}
