//! Insight configuration
//!
//! Built once at process start and shared read-only (`Arc<InsightConfig>`)
//! with every pipeline run. Callers cannot change model, temperature, or token
//! limits per request.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override (explicit path, or ~/.local/share/ember/config/insights.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aggregate::MAX_WINDOW_DAYS;
use crate::error::{Error, Result};
use crate::prompts::Prompt;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/insights.toml");

/// Settings for the narrative generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Chat-completions server root, without trailing slash
    pub base_url: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.4,
            max_output_tokens: 900,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Settings for the deterministic aggregation steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    pub window_days: i64,
    pub max_themes: usize,
    pub max_recent_entries: usize,
    pub excerpt_chars: usize,
    pub limited_entry_threshold: usize,
    pub sparse_word_threshold: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            max_themes: 5,
            max_recent_entries: 7,
            excerpt_chars: 240,
            limited_entry_threshold: 3,
            sparse_word_threshold: 60,
        }
    }
}

/// Immutable configuration for the whole pipeline
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub generation: GenerationConfig,
    pub aggregation: AggregationConfig,
    pub prompt: Prompt,
    /// Config file this was loaded from (`None` for embedded defaults)
    pub config_path: Option<PathBuf>,
}

impl InsightConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        let path = default_config_path().filter(|p| p.exists());
        Self::load_from(path.as_deref())
    }

    /// Load from an explicit config file
    pub fn with_config_path(path: &Path) -> Result<Self> {
        Self::load_from(Some(path))
    }

    /// Embedded config and prompt only, ignoring any override files
    pub fn embedded() -> Result<Self> {
        let raw = parse_raw(DEFAULT_CONFIG)?;
        let (generation, aggregation) = apply(raw)?;
        Ok(Self {
            generation,
            aggregation,
            prompt: Prompt::embedded()?,
            config_path: None,
        })
    }

    fn load_from(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(p) => fs::read_to_string(p).map_err(|e| {
                Error::Config(format!("Failed to read config {}: {}", p.display(), e))
            })?,
            None => DEFAULT_CONFIG.to_string(),
        };

        let raw = parse_raw(&content)?;
        let prompt_path = raw.prompt.as_ref().and_then(|p| p.path.clone());
        let (generation, aggregation) = apply(raw)?;
        let prompt = Prompt::load(prompt_path.as_deref())?;

        tracing::debug!(
            model = %generation.model,
            config = ?path,
            prompt_version = prompt.metadata.version,
            "Loaded insight config"
        );

        Ok(Self {
            generation,
            aggregation,
            prompt,
            config_path: path.map(Path::to_path_buf),
        })
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ember").join("config").join("insights.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    generation: Option<RawGeneration>,
    aggregation: Option<RawAggregation>,
    prompt: Option<RawPrompt>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawGeneration {
    model: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAggregation {
    window_days: Option<i64>,
    max_themes: Option<usize>,
    max_recent_entries: Option<usize>,
    excerpt_chars: Option<usize>,
    limited_entry_threshold: Option<usize>,
    sparse_word_threshold: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPrompt {
    path: Option<PathBuf>,
}

fn parse_raw(content: &str) -> Result<RawConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
}

/// Merge raw values over defaults and validate ranges
fn apply(raw: RawConfig) -> Result<(GenerationConfig, AggregationConfig)> {
    let mut generation = GenerationConfig::default();
    let mut aggregation = AggregationConfig::default();

    if let Some(g) = raw.generation {
        if let Some(model) = g.model {
            generation.model = model;
        }
        if let Some(temperature) = g.temperature {
            generation.temperature = temperature;
        }
        if let Some(max) = g.max_output_tokens {
            generation.max_output_tokens = max;
        }
        if let Some(url) = g.base_url {
            generation.base_url = url.trim_end_matches('/').to_string();
        }
    }

    if let Some(a) = raw.aggregation {
        if let Some(days) = a.window_days {
            aggregation.window_days = days;
        }
        if let Some(max) = a.max_themes {
            aggregation.max_themes = max;
        }
        if let Some(max) = a.max_recent_entries {
            aggregation.max_recent_entries = max;
        }
        if let Some(chars) = a.excerpt_chars {
            aggregation.excerpt_chars = chars;
        }
        if let Some(threshold) = a.limited_entry_threshold {
            aggregation.limited_entry_threshold = threshold;
        }
        if let Some(threshold) = a.sparse_word_threshold {
            aggregation.sparse_word_threshold = threshold;
        }
    }

    if generation.model.trim().is_empty() {
        return Err(Error::Config("generation.model must not be empty".into()));
    }
    if !(0.0..=2.0).contains(&generation.temperature) {
        return Err(Error::Config(format!(
            "generation.temperature must be between 0 and 2, got {}",
            generation.temperature
        )));
    }
    if generation.max_output_tokens == 0 {
        return Err(Error::Config(
            "generation.max_output_tokens must be positive".into(),
        ));
    }
    if !(1..=MAX_WINDOW_DAYS).contains(&aggregation.window_days) {
        return Err(Error::Config(format!(
            "aggregation.window_days must be between 1 and {}, got {}",
            MAX_WINDOW_DAYS, aggregation.window_days
        )));
    }

    Ok((generation, aggregation))
}
