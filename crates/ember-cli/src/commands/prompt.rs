//! Prompt preview and configuration display

use anyhow::Result;
use chrono::{DateTime, Utc};
use ember_core::config::default_config_path;
use ember_core::prompts::default_prompts_dir;
use ember_core::{InsightConfig, InsightPipeline, JournalEntry};

/// Print the system and user messages for these entries
pub fn cmd_prompt(
    pipeline: &InsightPipeline,
    entries: &[JournalEntry],
    now: DateTime<Utc>,
) -> Result<()> {
    let prepared = pipeline.prepare(entries, now);
    let request = pipeline.client().build_request(&prepared.input)?;

    println!("Model: {}", request.model);
    println!(
        "Temperature: {}  Max output tokens: {}",
        request.temperature, request.max_output_tokens
    );
    println!();
    println!("--- System ---");
    println!("{}", request.system);
    println!();
    println!("--- User ---");
    println!("{}", request.user);

    Ok(())
}

pub fn cmd_config(config: &InsightConfig) -> Result<()> {
    let generation = &config.generation;
    let aggregation = &config.aggregation;

    println!();
    println!("⚙️  Ember Configuration");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Config file: {}",
        config
            .config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(built-in defaults)".to_string())
    );
    println!(
        "   Override path: {}",
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );
    println!();
    println!("   Model: {}", generation.model);
    println!("   Temperature: {}", generation.temperature);
    println!("   Max output tokens: {}", generation.max_output_tokens);
    println!("   Base URL: {}", generation.base_url);
    println!();
    println!("   Window: {} days", aggregation.window_days);
    println!("   Max themes: {}", aggregation.max_themes);
    println!("   Recent entries in prompt: {}", aggregation.max_recent_entries);
    println!("   Excerpt length: {} chars", aggregation.excerpt_chars);
    println!(
        "   Limited data below: {} entries or {} words",
        aggregation.limited_entry_threshold, aggregation.sparse_word_threshold
    );
    println!();

    let prompt = &config.prompt;
    let source = prompt
        .override_path
        .as_ref()
        .map(|p| format!("✓ Custom ({})", p.display()))
        .unwrap_or_else(|| "Default".to_string());
    println!(
        "   Prompt: {} v{} - {}",
        prompt.metadata.id, prompt.metadata.version, source
    );
    println!(
        "   Prompt override directory: {}",
        default_prompts_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );

    Ok(())
}
