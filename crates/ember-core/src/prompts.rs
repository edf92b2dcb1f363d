//! Prompt template and builder for weekly insights
//!
//! The template is loaded with a two-layer resolution:
//! 1. Check for an override (explicit path, or the data dir at
//!    ~/.local/share/ember/prompts/weekly_insight.md)
//! 2. Fall back to the embedded default (compiled into binary)
//!
//! The loaded template becomes part of [`crate::config::InsightConfig`], so it
//! is read once at startup and never changes during a run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::AggregationConfig;
use crate::error::{Error, Result};
use crate::models::InsightInput;

/// Embedded default prompt (compiled into binary)
const DEFAULT_PROMPT: &str = include_str!("../../../prompts/weekly_insight.md");

/// Prompt file name inside override directories
pub const PROMPT_FILE: &str = "weekly_insight.md";

/// Opening sentence required when the week has too little data
pub const SMALL_SAMPLE_DISCLAIMER: &str =
    "These insights are based on a small number of entries.";

/// Placeholder for labels the aggregator could not determine
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Placeholder when the window has no entries to excerpt
pub const NO_ENTRIES_PLACEHOLDER: &str = "(none)";

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Path to override file, `None` for the embedded default
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Parse the embedded default template
    pub fn embedded() -> Result<Self> {
        let (metadata, content) = parse_prompt(DEFAULT_PROMPT)?;
        Ok(Self {
            metadata,
            content,
            override_path: None,
        })
    }

    /// Load from an explicit path, or the data-dir override, or the embedded default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_prompts_dir()
                .map(|d| d.join(PROMPT_FILE))
                .filter(|p| p.exists()),
        };

        let Some(override_path) = candidate else {
            return Self::embedded();
        };

        let content = fs::read_to_string(&override_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read prompt override {}: {}",
                override_path.display(),
                e
            ))
        })?;
        let (metadata, content) = parse_prompt(&content)?;
        tracing::debug!(path = %override_path.display(), version = metadata.version, "Loaded prompt override");

        Ok(Self {
            metadata,
            content,
            override_path: Some(override_path),
        })
    }

    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }
}

/// Fully rendered two-part instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Renders the weekly insight prompt from aggregated input
pub struct PromptBuilder<'a> {
    prompt: &'a Prompt,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(prompt: &'a Prompt) -> Self {
        Self { prompt }
    }

    /// Render both sections for one window
    pub fn build(&self, input: &InsightInput) -> Result<RenderedPrompt> {
        let system = self.prompt.system_section().ok_or_else(|| {
            Error::Config("Prompt template has no '# System' section".into())
        })?;
        let user = self
            .prompt
            .user_section()
            .ok_or_else(|| Error::Config("Prompt template has no '# User' section".into()))?;

        let window_start = input.window_start.format("%a %b %-d, %Y").to_string();
        let window_end = input.window_end.format("%a %b %-d, %Y").to_string();
        let entry_count = input.entry_count.to_string();
        let usual_writing_hour = input
            .usual_writing_hour
            .map(|h| format!("{:02}:00 UTC", h))
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        let recent_entries = if input.recent_entries.is_empty() {
            NO_ENTRIES_PLACEHOLDER.to_string()
        } else {
            input.recent_entries.join("\n")
        };

        let mut vars: HashMap<&str, &str> = HashMap::new();
        vars.insert("disclaimer", SMALL_SAMPLE_DISCLAIMER);
        vars.insert("window_start", &window_start);
        vars.insert("window_end", &window_end);
        vars.insert("entry_count", &entry_count);
        vars.insert("mood_distribution", &input.mood_distribution);
        vars.insert("mood_trends", &input.mood_trends);
        vars.insert(
            "dominant_theme",
            input.dominant_theme.as_deref().unwrap_or(UNKNOWN_LABEL),
        );
        vars.insert("top_themes", &input.top_themes);
        vars.insert(
            "most_active_day",
            input.most_active_day.as_deref().unwrap_or(UNKNOWN_LABEL),
        );
        vars.insert("usual_writing_hour", &usual_writing_hour);
        vars.insert("recent_entries", &recent_entries);
        if let Some(ref note) = input.limited_data_note {
            vars.insert("limited_data_note", note);
        }

        Ok(RenderedPrompt {
            system: render(system, &vars),
            user: render(user, &vars),
        })
    }
}

/// Note appended to the prompt when the window is too thin to generalize from
pub fn limited_data_note(
    entry_count: usize,
    word_count: usize,
    config: &AggregationConfig,
) -> Option<String> {
    if entry_count >= config.limited_entry_threshold && word_count >= config.sparse_word_threshold
    {
        return None;
    }

    let entries = if entry_count == 1 { "entry" } else { "entries" };
    Some(format!(
        "Only {} {} ({} words) were written this week. Open with \"{}\" and keep every observation tentative.",
        entry_count, entries, word_count, SMALL_SAMPLE_DISCLAIMER
    ))
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ember").join("prompts"))
}

/// Resolve conditional blocks, then substitute `{{var}}` placeholders
///
/// Only tokens written in the template are replaced. Substituted values are
/// copied through verbatim, so journal text that happens to contain `{{...}}`
/// is never interpreted.
fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let template = remove_unmatched_conditionals(template, vars);
    let mut result = String::with_capacity(template.len());
    let mut rest = template.as_str();

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let Some(close) = after_open.find("}}") else {
            rest = &rest[open..];
            break;
        };

        let name = &after_open[..close];
        match vars.get(name) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::Config(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::Config("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Config(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Runs until the next top-level header
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Keep `{{#if var}}...{{/if}}` bodies whose variable is set, drop the rest
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = &result[var_start..var_start + var_end];
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = &result[block_start..block_start + endif_pos];
        let full_end = block_start + endif_pos + 7;

        let should_include = vars.get(var_name).is_some_and(|v| !v.is_empty());
        result = if should_include {
            format!(
                "{}{}{}",
                &result[..if_start],
                block_content,
                &result[full_end..]
            )
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}
