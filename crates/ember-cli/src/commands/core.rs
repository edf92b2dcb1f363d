//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the insight config (explicit path, override, built-in)
//! - `load_entries` - Read a JSON array of journal entries
//! - `parse_now` - Reference time from `--now`
//! - `credential_from_env` - Provider credential
//! - `build_pipeline` - Pipeline with the backend picked by `AI_BACKEND`

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ember_core::{AIClient, InsightConfig, InsightPipeline, JournalEntry};

/// Environment variable holding the provider credential
pub const CREDENTIAL_ENV: &str = "EMBER_API_KEY";

pub fn load_config(path: Option<&Path>) -> Result<Arc<InsightConfig>> {
    let config = match path {
        Some(p) => InsightConfig::with_config_path(p)
            .with_context(|| format!("Failed to load config from {}", p.display()))?,
        None => InsightConfig::load().context("Failed to load insight config")?,
    };
    Ok(Arc::new(config))
}

pub fn load_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entries file {}", path.display()))?;
    let entries: Vec<JournalEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid entries JSON in {}", path.display()))?;

    tracing::debug!(count = entries.len(), "Loaded journal entries");
    Ok(entries)
}

pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --now '{}': expected RFC 3339", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

pub fn credential_from_env() -> Option<String> {
    std::env::var(CREDENTIAL_ENV).ok()
}

pub fn build_pipeline(config: Arc<InsightConfig>) -> InsightPipeline {
    let backend = AIClient::from_env(&config.generation);
    InsightPipeline::new(config, backend)
}
