//! Rolling-window aggregation of journal signals
//!
//! Two disjoint windows are compared:
//! - current:  `[now - N days, now)`
//! - previous: `[now - 2N days, now - N days)`
//!
//! Mood counts and trends are computed per window. Writing habits (most
//! active weekday, average hour) intentionally look at every entry supplied,
//! not just the current window.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use serde::Serialize;

use crate::models::{JournalEntry, Mood, MoodDistribution, TrendDelta, TrendDirection};

/// Half-open time span `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// When and how often the person writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingHabits {
    /// Weekday name with the most entries, e.g. "Tuesday"
    pub most_active_day: Option<String>,
    /// Mean hour of day (UTC), rounded
    pub average_hour: Option<u32>,
}

/// Everything the aggregator derives for one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub current_window: Window,
    pub previous_window: Window,
    pub current_entry_count: usize,
    pub previous_entry_count: usize,
    pub current_word_count: usize,
    pub mood_distribution: MoodDistribution,
    pub previous_mood_distribution: MoodDistribution,
    pub trends: Vec<TrendDelta>,
    pub dominant_mood: Option<Mood>,
    pub writing_habits: WritingHabits,
}

impl WeeklyStats {
    /// One-line trend rendering for the prompt
    pub fn trend_summary(&self) -> String {
        if self.trends.is_empty() {
            return "No earlier entries to compare".to_string();
        }

        self.trends
            .iter()
            .map(|t| match t.direction {
                TrendDirection::Up => format!("{} up {}%", t.mood, t.percent_change),
                TrendDirection::Down => format!("{} down {}%", t.mood, t.percent_change),
                TrendDirection::Neutral => format!("{} no clear change", t.mood),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Longest supported window; keeps `now - 2N days` representable
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Splits entries into comparison windows and computes mood statistics
#[derive(Debug, Clone, Copy)]
pub struct WindowAggregator {
    now: DateTime<Utc>,
    window_days: i64,
}

impl WindowAggregator {
    /// `window_days` is clamped to `1..=MAX_WINDOW_DAYS`
    pub fn new(now: DateTime<Utc>, window_days: i64) -> Self {
        Self {
            now,
            window_days: window_days.clamp(1, MAX_WINDOW_DAYS),
        }
    }

    /// Standard seven-day comparison
    pub fn weekly(now: DateTime<Utc>) -> Self {
        Self::new(now, 7)
    }

    pub fn current_window(&self) -> Window {
        Window {
            start: self.now - Duration::days(self.window_days),
            end: self.now,
        }
    }

    pub fn previous_window(&self) -> Window {
        Window {
            start: self.now - Duration::days(self.window_days * 2),
            end: self.now - Duration::days(self.window_days),
        }
    }

    /// Entries falling in the current window, input order preserved
    pub fn current_entries<'e>(&self, entries: &'e [JournalEntry]) -> Vec<&'e JournalEntry> {
        let window = self.current_window();
        entries.iter().filter(|e| window.contains(e.date)).collect()
    }

    /// Entries falling in the previous window, input order preserved
    pub fn previous_entries<'e>(&self, entries: &'e [JournalEntry]) -> Vec<&'e JournalEntry> {
        let window = self.previous_window();
        entries.iter().filter(|e| window.contains(e.date)).collect()
    }

    pub fn aggregate(&self, entries: &[JournalEntry]) -> WeeklyStats {
        let current = self.current_entries(entries);
        let previous = self.previous_entries(entries);

        let current_moods = mood_distribution(&current);
        let previous_moods = mood_distribution(&previous);
        let trends = compute_trends(&current_moods, &previous_moods);

        let stats = WeeklyStats {
            current_window: self.current_window(),
            previous_window: self.previous_window(),
            current_entry_count: current.len(),
            previous_entry_count: previous.len(),
            current_word_count: current.iter().map(|e| e.word_count()).sum(),
            dominant_mood: dominant_mood(&current),
            mood_distribution: current_moods,
            previous_mood_distribution: previous_moods,
            trends,
            writing_habits: writing_habits(entries),
        };

        tracing::debug!(
            current = stats.current_entry_count,
            previous = stats.previous_entry_count,
            dominant = ?stats.dominant_mood,
            "Aggregated journal windows"
        );

        stats
    }
}

/// Count moods, skipping entries without one
pub fn mood_distribution(entries: &[&JournalEntry]) -> MoodDistribution {
    let mut counts: BTreeMap<Mood, u32> = BTreeMap::new();
    for mood in entries.iter().filter_map(|e| e.mood) {
        *counts.entry(mood).or_insert(0) += 1;
    }
    MoodDistribution {
        counts: counts.into_iter().collect(),
    }
}

/// Most frequent mood; ties go to the mood encountered first
pub fn dominant_mood(entries: &[&JournalEntry]) -> Option<Mood> {
    first_encounter_max(entries.iter().filter_map(|e| e.mood))
}

/// Trend for a single mood between two window counts
///
/// A previous count of zero cannot produce a percentage, so the trend is
/// neutral regardless of the current count.
pub fn trend_for(mood: Mood, current: u32, previous: u32) -> TrendDelta {
    if previous == 0 {
        return TrendDelta {
            mood,
            direction: TrendDirection::Neutral,
            percent_change: 0,
        };
    }

    let diff = (current as f64 - previous as f64).abs();
    let percent_change = (diff / previous as f64 * 100.0).round() as u32;
    let direction = if current > previous {
        TrendDirection::Up
    } else if current < previous {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    };

    TrendDelta {
        mood,
        direction,
        percent_change,
    }
}

/// Trends for every mood present in either window, in declaration order
pub fn compute_trends(current: &MoodDistribution, previous: &MoodDistribution) -> Vec<TrendDelta> {
    Mood::ALL
        .iter()
        .filter(|m| current.count(**m) > 0 || previous.count(**m) > 0)
        .map(|m| trend_for(*m, current.count(*m), previous.count(*m)))
        .collect()
}

/// Writing-habit stats across all supplied entries
pub fn writing_habits(entries: &[JournalEntry]) -> WritingHabits {
    if entries.is_empty() {
        return WritingHabits::default();
    }

    let most_active_day =
        first_encounter_max(entries.iter().map(|e| e.date.weekday())).map(weekday_name);

    let total_hours: u32 = entries.iter().map(|e| e.date.hour()).sum();
    let average_hour = (total_hours as f64 / entries.len() as f64).round() as u32;

    WritingHabits {
        most_active_day,
        average_hour: Some(average_hour),
    }
}

pub fn weekday_name(day: Weekday) -> String {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
    .to_string()
}

/// Highest-count value; equal counts keep whichever appeared first
fn first_encounter_max<T: PartialEq + Copy>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut seen: Vec<(T, u32)> = Vec::new();
    for item in items {
        match seen.iter_mut().find(|(v, _)| *v == item) {
            Some((_, count)) => *count += 1,
            None => seen.push((item, 1)),
        }
    }

    let mut best: Option<(T, u32)> = None;
    for (value, count) in seen {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
