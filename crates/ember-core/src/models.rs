//! Data models for Ember

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mood attached to a journal entry
///
/// Declaration order doubles as the tie-break order for rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Grateful,
    Excited,
    Neutral,
    Tired,
    Anxious,
    Sad,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 9] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Grateful,
        Mood::Excited,
        Mood::Neutral,
        Mood::Tired,
        Mood::Anxious,
        Mood::Sad,
        Mood::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Grateful => "grateful",
            Mood::Excited => "excited",
            Mood::Neutral => "neutral",
            Mood::Tired => "tired",
            Mood::Anxious => "anxious",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown mood: {}", s))
    }
}

/// A journal entry as supplied by the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Entries saved without a mood still count toward entry totals
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub content: String,
}

impl JournalEntry {
    pub fn new(
        id: impl Into<String>,
        date: DateTime<Utc>,
        mood: Option<Mood>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            mood,
            content: content.into(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Mood counts over one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodDistribution {
    /// Counts in `Mood` declaration order, moods with zero count omitted
    pub counts: Vec<(Mood, u32)>,
}

impl MoodDistribution {
    pub fn count(&self, mood: Mood) -> u32 {
        self.counts
            .iter()
            .find(|(m, _)| *m == mood)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Number of entries in the window that carried a mood
    pub fn total_with_mood(&self) -> u32 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Share of the window for `mood`; `None` when no entry had a mood
    pub fn percentage(&self, mood: Mood) -> Option<f64> {
        let total = self.total_with_mood();
        if total == 0 {
            return None;
        }
        Some(self.count(mood) as f64 / total as f64 * 100.0)
    }

    /// Moods sorted by count descending, ties in declaration order
    pub fn ranked(&self) -> Vec<(Mood, u32)> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Prompt serialization, e.g. `calm: 3 (60%), happy: 2 (40%)`
    pub fn summary(&self) -> String {
        if self.total_with_mood() == 0 {
            return "No moods recorded".to_string();
        }

        self.ranked()
            .into_iter()
            .map(|(mood, count)| {
                let pct = self.percentage(mood).unwrap_or(0.0).round() as u32;
                format!("{}: {} ({}%)", mood, count, pct)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Neutral => "neutral",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Change in one mood's count between the previous and current window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDelta {
    pub mood: Mood,
    pub direction: TrendDirection,
    pub percent_change: u32,
}

/// A topic inferred from keyword hits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub count: u32,
}

/// Aggregated signals handed to prompt construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightInput {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub entry_count: usize,
    pub mood_distribution: String,
    pub mood_trends: String,
    pub dominant_theme: Option<String>,
    pub top_themes: String,
    pub most_active_day: Option<String>,
    /// Mean writing hour (UTC) across all entries
    pub usual_writing_hour: Option<u32>,
    /// Pre-rendered `- ...` lines, newest window entries in date order
    pub recent_entries: Vec<String>,
    pub limited_data_note: Option<String>,
}

/// Structured weekly narrative returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub how_you_felt: String,
    pub weekly_summary: String,
    pub mood_drivers: Vec<String>,
    pub patterns: Vec<String>,
    pub suggestions: Vec<String>,
    pub confidence: f64,
}

impl InsightResult {
    /// Confidence used when the provider omits it or sends a non-number
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;

    pub fn confidence_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }
}

impl Default for InsightResult {
    fn default() -> Self {
        Self {
            how_you_felt: String::new(),
            weekly_summary: String::new(),
            mood_drivers: Vec::new(),
            patterns: Vec::new(),
            suggestions: Vec::new(),
            confidence: Self::DEFAULT_CONFIDENCE,
        }
    }
}
