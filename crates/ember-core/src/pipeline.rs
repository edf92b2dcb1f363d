//! Weekly insight pipeline
//!
//! `prepare` is pure: windows, mood stats, themes, and the prompt input are
//! derived from the entries and `now` alone. `run` adds the single
//! generation call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{WeeklyStats, WindowAggregator};
use crate::ai::AIClient;
use crate::config::InsightConfig;
use crate::error::Result;
use crate::models::{InsightInput, InsightResult, JournalEntry, Theme};
use crate::narrative::NarrativeClient;
use crate::prompts::limited_data_note;
use crate::themes::{theme_summary, ThemeExtractor};

/// Label used in recent-entry bullets for entries saved without a mood
const NO_MOOD_LABEL: &str = "no mood";

/// Everything derived locally, before the provider is involved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedInsight {
    pub stats: WeeklyStats,
    pub themes: Vec<Theme>,
    pub input: InsightInput,
}

/// Pipeline output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyInsight {
    pub stats: WeeklyStats,
    pub themes: Vec<Theme>,
    pub narrative: InsightResult,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// Aggregation, theme extraction, and narrative generation for one person
#[derive(Clone)]
pub struct InsightPipeline {
    client: NarrativeClient,
    themes: ThemeExtractor,
}

impl InsightPipeline {
    pub fn new(config: Arc<InsightConfig>, backend: AIClient) -> Self {
        let themes = ThemeExtractor::default().with_max_themes(config.aggregation.max_themes);
        Self {
            client: NarrativeClient::new(config, backend),
            themes,
        }
    }

    /// Replace the built-in theme dictionary
    pub fn with_theme_extractor(mut self, themes: ThemeExtractor) -> Self {
        self.themes = themes;
        self
    }

    pub fn client(&self) -> &NarrativeClient {
        &self.client
    }

    pub fn prepare(&self, entries: &[JournalEntry], now: DateTime<Utc>) -> PreparedInsight {
        let aggregation = &self.client.config().aggregation;
        let aggregator = WindowAggregator::new(now, aggregation.window_days);

        let stats = aggregator.aggregate(entries);
        let current = aggregator.current_entries(entries);
        let themes = self.themes.extract(current.iter().copied());

        let recent_entries = recent_entry_lines(
            &current,
            aggregation.max_recent_entries,
            aggregation.excerpt_chars,
        );

        let input = InsightInput {
            window_start: stats.current_window.start,
            window_end: stats.current_window.end,
            entry_count: stats.current_entry_count,
            mood_distribution: stats.mood_distribution.summary(),
            mood_trends: stats.trend_summary(),
            dominant_theme: themes.first().map(|t| t.name.clone()),
            top_themes: theme_summary(&themes),
            most_active_day: stats.writing_habits.most_active_day.clone(),
            usual_writing_hour: stats.writing_habits.average_hour,
            recent_entries,
            limited_data_note: limited_data_note(
                stats.current_entry_count,
                stats.current_word_count,
                aggregation,
            ),
        };

        PreparedInsight {
            stats,
            themes,
            input,
        }
    }

    pub async fn run(
        &self,
        entries: &[JournalEntry],
        now: DateTime<Utc>,
        credential: Option<&str>,
    ) -> Result<WeeklyInsight> {
        let prepared = self.prepare(entries, now);
        let narrative = self
            .client
            .generate_insight(&prepared.input, credential)
            .await?;

        info!(
            entries = prepared.stats.current_entry_count,
            themes = prepared.themes.len(),
            limited = prepared.input.limited_data_note.is_some(),
            "Weekly insight ready"
        );

        Ok(WeeklyInsight {
            stats: prepared.stats,
            themes: prepared.themes,
            narrative,
            model: self.client.config().generation.model.clone(),
            generated_at: Utc::now(),
        })
    }
}

/// Newest `limit` entries, oldest first, as prompt bullets
fn recent_entry_lines(entries: &[&JournalEntry], limit: usize, excerpt_chars: usize) -> Vec<String> {
    let mut ordered = entries.to_vec();
    ordered.sort_by_key(|e| e.date);
    let skip = ordered.len().saturating_sub(limit);

    ordered[skip..]
        .iter()
        .map(|e| {
            let mood = e
                .mood
                .map(|m| m.to_string())
                .unwrap_or_else(|| NO_MOOD_LABEL.to_string());
            format!(
                "- {} ({}): {}",
                e.date.format("%a %b %-d"),
                mood,
                excerpt(&e.content, excerpt_chars)
            )
        })
        .collect()
}

/// Whitespace-collapsed text cut to `max_chars` characters
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockBackend, MockReply};
    use crate::error::Error;
    use crate::models::Mood;
    use crate::prompts::SMALL_SAMPLE_DISCLAIMER;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // Sunday
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn pipeline(backend: MockBackend) -> InsightPipeline {
        let config = Arc::new(InsightConfig::embedded().unwrap());
        InsightPipeline::new(config, AIClient::Mock(backend))
    }

    fn busy_week() -> Vec<JournalEntry> {
        let long = "word ".repeat(30);
        vec![
            JournalEntry::new("1", at(13, 20), Some(Mood::Calm), format!("Evening walk in the park. {}", long)),
            JournalEntry::new("2", at(12, 21), Some(Mood::Anxious), format!("Project deadline at work. {}", long)),
            JournalEntry::new("3", at(15, 19), Some(Mood::Calm), format!("Meditation before bed. {}", long)),
            JournalEntry::new("4", at(6, 9), Some(Mood::Sad), "Last week was rough."),
        ]
    }

    #[test]
    fn test_prepare_builds_input() {
        let prepared = pipeline(MockBackend::new()).prepare(&busy_week(), now());
        let input = &prepared.input;

        assert_eq!(input.entry_count, 3);
        assert_eq!(input.window_end, now());
        assert!(input.mood_distribution.starts_with("calm: 2 (67%)"));
        assert_eq!(prepared.stats.previous_entry_count, 1);
        assert!(input.limited_data_note.is_none());
        assert!(input.dominant_theme.is_some());
        assert_ne!(input.top_themes, "None detected");
    }

    #[test]
    fn test_recent_entries_oldest_first() {
        let prepared = pipeline(MockBackend::new()).prepare(&busy_week(), now());
        let lines = &prepared.input.recent_entries;

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("- Mon Oct 12 (anxious): Project deadline"));
        assert!(lines[1].starts_with("- Tue Oct 13 (calm): Evening walk"));
        assert!(lines[2].starts_with("- Thu Oct 15 (calm): Meditation"));
    }

    #[test]
    fn test_recent_entries_keep_newest() {
        let entries: Vec<JournalEntry> = (12..=17)
            .map(|day| JournalEntry::new(day.to_string(), at(day, 8), None, "note"))
            .collect();

        let lines: Vec<String> = {
            let refs: Vec<&JournalEntry> = entries.iter().collect();
            recent_entry_lines(&refs, 2, 240)
        };
        assert_eq!(
            lines,
            vec!["- Fri Oct 16 (no mood): note", "- Sat Oct 17 (no mood): note"]
        );
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  spaced \n\n out  ", 100), "spaced out");
        assert_eq!(excerpt("abcdef ghij", 8), "abcdef g...");
        assert_eq!(excerpt("abcdef ghij", 7), "abcdef...");
        assert_eq!(excerpt("", 10), "");
    }

    #[test]
    fn test_sparse_window_gets_note() {
        let entries = vec![JournalEntry::new("1", at(16, 10), Some(Mood::Tired), "Long day.")];
        let prepared = pipeline(MockBackend::new()).prepare(&entries, now());

        let note = prepared.input.limited_data_note.unwrap();
        assert!(note.starts_with("Only 1 entry (2 words)"));
        assert!(note.contains(SMALL_SAMPLE_DISCLAIMER));
    }

    #[test]
    fn test_empty_entries() {
        let prepared = pipeline(MockBackend::new()).prepare(&[], now());

        assert_eq!(prepared.input.entry_count, 0);
        assert!(prepared.input.recent_entries.is_empty());
        assert!(prepared.input.dominant_theme.is_none());
        assert!(prepared.input.most_active_day.is_none());
        assert_eq!(prepared.input.mood_distribution, "No moods recorded");
        assert!(prepared.input.limited_data_note.is_some());
    }

    #[tokio::test]
    async fn test_run_with_mock() {
        let backend = MockBackend::new();
        let insight = pipeline(backend.clone())
            .run(&busy_week(), now(), Some("sk-test"))
            .await
            .unwrap();

        assert_eq!(insight.model, "gpt-4o-mini");
        assert_eq!(insight.stats.current_entry_count, 3);
        assert!(!insight
            .narrative
            .how_you_felt
            .starts_with(SMALL_SAMPLE_DISCLAIMER));

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user.contains("Evening walk in the park."));
    }

    #[tokio::test]
    async fn test_run_propagates_errors() {
        let backend = MockBackend::with_reply(MockReply::Text("Sorry, no.".into()));
        let result = pipeline(backend).run(&busy_week(), now(), Some("sk")).await;
        assert!(matches!(result, Err(Error::Parse { .. })));
    }
}
