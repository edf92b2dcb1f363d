//! Ember Core Library
//!
//! Weekly insight generation for the Ember journal:
//! - Rolling-window mood aggregation and trends
//! - Keyword theme extraction
//! - Prompt templates with file overrides
//! - Schema-constrained narrative generation over pluggable backends
//! - Tolerant parsing of model output
//! - Provider failure classification

pub mod aggregate;
pub mod ai;
pub mod config;
pub mod error;
pub mod models;
pub mod narrative;
pub mod pipeline;
pub mod prompts;
pub mod themes;

/// Test utilities including mock chat-completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{WeeklyStats, Window, WindowAggregator, WritingHabits};
pub use ai::{
    AIClient, GenerationBackend, GenerationOutput, GenerationRequest, MockBackend, MockReply,
    OpenAIBackend, ProviderError, RawGeneration,
};
pub use config::{AggregationConfig, GenerationConfig, InsightConfig};
pub use error::{Error, Result};
pub use models::{
    InsightInput, InsightResult, JournalEntry, Mood, MoodDistribution, Theme, TrendDelta,
    TrendDirection,
};
pub use narrative::NarrativeClient;
pub use pipeline::{InsightPipeline, PreparedInsight, WeeklyInsight};
pub use prompts::{Prompt, PromptBuilder, RenderedPrompt, SMALL_SAMPLE_DISCLAIMER};
pub use themes::ThemeExtractor;
