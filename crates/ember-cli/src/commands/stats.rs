//! Stats command: windows, moods, trends, themes, writing habits

use anyhow::Result;
use chrono::{DateTime, Utc};
use ember_core::{InsightPipeline, JournalEntry};

pub fn cmd_stats(
    pipeline: &InsightPipeline,
    entries: &[JournalEntry],
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let prepared = pipeline.prepare(entries, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&prepared)?);
        return Ok(());
    }

    let stats = &prepared.stats;
    let input = &prepared.input;

    println!();
    println!("📓 Weekly Stats");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Window: {} → {}",
        stats.current_window.start.format("%Y-%m-%d %H:%M"),
        stats.current_window.end.format("%Y-%m-%d %H:%M")
    );
    println!(
        "   Entries: {} ({} words), previous window: {}",
        stats.current_entry_count, stats.current_word_count, stats.previous_entry_count
    );
    println!("   Moods: {}", input.mood_distribution);
    println!("   Trends: {}", input.mood_trends);
    println!(
        "   Dominant mood: {}",
        stats
            .dominant_mood
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("   Themes: {}", input.top_themes);
    println!(
        "   Most active day: {}",
        stats.writing_habits.most_active_day.as_deref().unwrap_or("-")
    );
    if let Some(hour) = stats.writing_habits.average_hour {
        println!("   Average writing hour: {:02}:00 UTC", hour);
    }

    if let Some(ref note) = input.limited_data_note {
        println!();
        println!("   ⚠️  {}", note);
    }

    Ok(())
}
