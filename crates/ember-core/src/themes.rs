//! Keyword-based theme extraction
//!
//! Every keyword hit counts, so an entry mentioning three work keywords adds
//! three to "Work". This per-hit weighting is what decides which themes
//! surface as "top"; counting once per entry would change the ranking.

use crate::models::{JournalEntry, Theme};

/// Built-in theme dictionary, in ranking tie-break order
///
/// Keywords are matched as lower-case substrings, so "run" also matches
/// "running".
pub const DEFAULT_THEMES: &[(&str, &[&str])] = &[
    (
        "Work",
        &["work", "job", "meeting", "deadline", "project", "boss", "office", "colleague"],
    ),
    (
        "Relationships",
        &["friend", "partner", "relationship", "date night", "love", "dating"],
    ),
    (
        "Family",
        &["family", "mom", "dad", "parent", "sister", "brother", "kids"],
    ),
    (
        "Health",
        &["exercise", "workout", "gym", "run", "doctor", "sick", "health"],
    ),
    (
        "Mindfulness",
        &["meditation", "calm", "mindful", "breath", "yoga", "gratitude"],
    ),
    ("Sleep", &["sleep", "tired", "insomnia", "nap", "rest"]),
    (
        "Creativity",
        &["writing", "art", "music", "paint", "draw", "creative"],
    ),
    (
        "Nature",
        &["walk", "park", "nature", "hike", "garden", "outside"],
    ),
];

/// Default number of themes returned
pub const DEFAULT_MAX_THEMES: usize = 5;

/// Scans entry text for dictionary keywords
#[derive(Debug, Clone)]
pub struct ThemeExtractor {
    dictionary: Vec<(String, Vec<String>)>,
    max_themes: usize,
}

impl Default for ThemeExtractor {
    fn default() -> Self {
        Self::new(
            DEFAULT_THEMES
                .iter()
                .map(|(name, keywords)| (*name, keywords.to_vec())),
        )
    }
}

impl ThemeExtractor {
    /// Build from a custom dictionary; keywords are lower-cased
    pub fn new<'a, I>(dictionary: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let dictionary: Vec<(String, Vec<String>)> = dictionary
            .into_iter()
            .map(|(name, keywords)| {
                (
                    name.to_string(),
                    keywords.into_iter().map(|k| k.to_lowercase()).collect(),
                )
            })
            .collect();
        Self {
            dictionary,
            max_themes: DEFAULT_MAX_THEMES,
        }
    }

    pub fn with_max_themes(mut self, max_themes: usize) -> Self {
        self.max_themes = max_themes;
        self
    }

    /// Hit count per theme, in dictionary order, including zero counts
    pub fn count<'e, I>(&self, entries: I) -> Vec<Theme>
    where
        I: IntoIterator<Item = &'e JournalEntry>,
    {
        let mut counts = vec![0u32; self.dictionary.len()];

        for entry in entries {
            let text = entry.content.to_lowercase();
            for (idx, (_, keywords)) in self.dictionary.iter().enumerate() {
                counts[idx] += keywords.iter().filter(|k| text.contains(k.as_str())).count() as u32;
            }
        }

        self.dictionary
            .iter()
            .zip(counts)
            .map(|((name, _), count)| Theme {
                name: name.clone(),
                count,
            })
            .collect()
    }

    /// Top themes by hit count; ties keep dictionary order
    pub fn extract<'e, I>(&self, entries: I) -> Vec<Theme>
    where
        I: IntoIterator<Item = &'e JournalEntry>,
    {
        let mut themes: Vec<Theme> = self
            .count(entries)
            .into_iter()
            .filter(|t| t.count > 0)
            .collect();

        // Stable sort keeps declaration order among equal counts
        themes.sort_by(|a, b| b.count.cmp(&a.count));
        themes.truncate(self.max_themes);
        themes
    }
}

/// Prompt rendering, e.g. `Work (4), Sleep (2)`
pub fn theme_summary(themes: &[Theme]) -> String {
    if themes.is_empty() {
        return "None detected".to_string();
    }
    themes
        .iter()
        .map(|t| format!("{} ({})", t.name, t.count))
        .collect::<Vec<_>>()
        .join(", ")
}
