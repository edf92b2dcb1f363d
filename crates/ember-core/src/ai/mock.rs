//! Mock backend for testing
//!
//! Without a scripted reply it answers with a plausible insight, opening with
//! the small-sample disclaimer whenever the prompt asks for one. Every request
//! is recorded so tests can inspect the rendered prompt.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::prompts::SMALL_SAMPLE_DISCLAIMER;

use super::classify::ProviderError;
use super::types::{GenerationOutput, GenerationRequest};
use super::{GenerationBackend, ProviderResult};

/// Scripted outcome for the next calls
#[derive(Debug, Clone)]
pub enum MockReply {
    Structured(Value),
    Text(String),
    /// Provider answered with nothing usable
    Empty,
    Fail(ProviderError),
}

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    reply: Option<MockReply>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `reply`
    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply: Some(reply),
            ..Self::default()
        }
    }

    /// Requests seen so far (shared between clones)
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(
        &self,
        _credential: &str,
        request: &GenerationRequest,
    ) -> ProviderResult<Option<GenerationOutput>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match &self.reply {
            Some(MockReply::Structured(value)) => Ok(Some(GenerationOutput::Structured(value.clone()))),
            Some(MockReply::Text(text)) => Ok(Some(GenerationOutput::RawText(text.clone()))),
            Some(MockReply::Empty) => Ok(None),
            Some(MockReply::Fail(err)) => Err(err.clone()),
            None => Ok(Some(GenerationOutput::Structured(default_insight(request)))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://local"
    }
}

fn default_insight(request: &GenerationRequest) -> Value {
    let sparse = request.user.contains(SMALL_SAMPLE_DISCLAIMER);

    let (how_you_felt, confidence) = if sparse {
        (
            format!(
                "{} From what you wrote, the week seemed to start gently.",
                SMALL_SAMPLE_DISCLAIMER
            ),
            0.3,
        )
    } else {
        ("You had a fairly steady week with a few brighter moments.".to_string(), 0.7)
    };

    json!({
        "howYouFelt": how_you_felt,
        "weeklySummary": "You kept showing up to write, which is worth noticing.",
        "moodDrivers": ["Time spent outside"],
        "patterns": ["You tend to write in the evening"],
        "suggestions": ["Keep a short note on the days you skip"],
        "confidence": confidence
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::insight_schema;

    fn request(user: &str) -> GenerationRequest {
        GenerationRequest {
            model: "mock".into(),
            temperature: 0.0,
            max_output_tokens: 100,
            system: format!("Begin with \"{}\" when data is sparse.", SMALL_SAMPLE_DISCLAIMER),
            user: user.into(),
            schema: insight_schema(),
        }
    }

    #[tokio::test]
    async fn test_default_reply_follows_prompt() {
        let backend = MockBackend::new();

        let Some(GenerationOutput::Structured(value)) =
            backend.generate("k", &request("Entries: 9")).await.unwrap()
        else {
            panic!("expected structured output");
        };
        assert!(!value["howYouFelt"]
            .as_str()
            .unwrap()
            .starts_with(SMALL_SAMPLE_DISCLAIMER));

        let sparse = format!("Note: Open with \"{}\"", SMALL_SAMPLE_DISCLAIMER);
        let Some(GenerationOutput::Structured(value)) =
            backend.generate("k", &request(&sparse)).await.unwrap()
        else {
            panic!("expected structured output");
        };
        assert!(value["howYouFelt"]
            .as_str()
            .unwrap()
            .starts_with(SMALL_SAMPLE_DISCLAIMER));
    }

    #[tokio::test]
    async fn test_scripted_replies() {
        let backend = MockBackend::with_reply(MockReply::Text("hello".into()));
        assert_eq!(
            backend.generate("k", &request("x")).await.unwrap(),
            Some(GenerationOutput::RawText("hello".into()))
        );

        let backend = MockBackend::with_reply(MockReply::Empty);
        assert_eq!(backend.generate("k", &request("x")).await.unwrap(), None);

        let failure = ProviderError::Api {
            status: 503,
            code: None,
            message: "down".into(),
        };
        let backend = MockBackend::with_reply(MockReply::Fail(failure.clone()));
        assert_eq!(backend.generate("k", &request("x")).await.unwrap_err(), failure);
    }

    #[tokio::test]
    async fn test_records_requests_across_clones() {
        let backend = MockBackend::new();
        let clone = backend.clone();

        clone.generate("k", &request("first")).await.unwrap();
        clone.generate("k", &request("second")).await.unwrap();

        let seen = backend.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].user, "second");
    }
}
