//! Insight command: one generation call for the current window

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use ember_core::{InsightPipeline, JournalEntry};

use super::CREDENTIAL_ENV;

pub async fn cmd_insight(
    pipeline: &InsightPipeline,
    entries: &[JournalEntry],
    now: DateTime<Utc>,
    credential: Option<&str>,
    raw: bool,
    json: bool,
) -> Result<()> {
    if raw {
        let prepared = pipeline.prepare(entries, now);
        let generation = pipeline
            .client()
            .generate_raw(&prepared.input, credential)
            .await
            .map_err(|e| report(&e))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&generation)?);
        } else {
            println!("{}", generation.raw_text.unwrap_or_default());
        }
        return Ok(());
    }

    let insight = pipeline
        .run(entries, now, credential)
        .await
        .map_err(|e| report(&e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    let narrative = &insight.narrative;

    println!();
    println!("✨ Your Week");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {}", narrative.how_you_felt);
    println!();
    println!("   {}", narrative.weekly_summary);

    for (title, items) in [
        ("What shaped your mood", &narrative.mood_drivers),
        ("Patterns", &narrative.patterns),
        ("Ideas for next week", &narrative.suggestions),
    ] {
        if items.is_empty() {
            continue;
        }
        println!();
        println!("   {}:", title);
        for item in items {
            println!("     • {}", item);
        }
    }

    println!();
    println!(
        "   Model: {}  Confidence: {:.0}%",
        insight.model,
        narrative.confidence * 100.0
    );

    Ok(())
}

/// Log the full error and turn it into the message shown to the user
fn report(err: &ember_core::Error) -> anyhow::Error {
    tracing::error!(error = %err, "Insight generation failed");
    if let ember_core::Error::Config(_) = err {
        return anyhow!("{} Set {} to enable insights.", err.user_message(), CREDENTIAL_ENV);
    }
    anyhow!("{}", err.user_message())
}
