//! Pluggable narrative generation backends
//!
//! # Architecture
//!
//! - `GenerationBackend` trait: one schema-constrained completion call
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAIBackend`, `MockBackend`
//!
//! Backends report failures as [`ProviderError`]; callers turn those into
//! crate errors with [`classify`].
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//!
//! The server URL comes from `generation.base_url` in the insight config.

pub mod classify;
mod mock;
mod openai;
pub mod parsing;
pub mod types;

pub use classify::{classify, ConnectionKind, ProviderError};
pub use mock::{MockBackend, MockReply};
pub use openai::OpenAIBackend;
pub use types::*;

use async_trait::async_trait;

use crate::config::GenerationConfig;

/// Result of a single backend call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Interface every narrative backend implements
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one completion constrained to `request.schema`
    ///
    /// `Ok(None)` means the provider answered but returned neither text nor a
    /// parsed object.
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> ProviderResult<Option<GenerationOutput>>;

    /// Backend name (for logging)
    fn name(&self) -> &str;

    /// Server URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat-completions API (or any server speaking it)
    OpenAI(OpenAIBackend),
    /// Scripted backend for tests and offline runs
    Mock(MockBackend),
}

impl AIClient {
    /// Pick a backend from `AI_BACKEND`
    pub fn from_env(config: &GenerationConfig) -> Self {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" => AIClient::openai(&config.base_url),
            "mock" => AIClient::mock(),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                AIClient::openai(&config.base_url)
            }
        }
    }

    pub fn openai(base_url: &str) -> Self {
        AIClient::OpenAI(OpenAIBackend::new(base_url))
    }

    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl GenerationBackend for AIClient {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> ProviderResult<Option<GenerationOutput>> {
        match self {
            AIClient::OpenAI(b) => b.generate(credential, request).await,
            AIClient::Mock(b) => b.generate(credential, request).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.name(),
            AIClient::Mock(b) => b.name(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
