// libs/search-cell/src/services/scoring.rs
//! Heuristic relevance scoring for search candidates.
//!
//! The ladder is additive across fields: a title tier (exact, prefix, or
//! substring), a subtitle tier (exact or substring), a description
//! substring bonus, and per-word token bonuses on title and subtitle.
//! Token bonuses stack on top of the tier that already fired for the same
//! field; ranking order depends on that overlap, so it is kept as is.

/// Points awarded by each rung of the scoring ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub title_exact: u32,
    pub title_prefix: u32,
    pub title_contains: u32,
    pub subtitle_exact: u32,
    pub subtitle_contains: u32,
    pub description_contains: u32,
    pub title_word: u32,
    pub subtitle_word: u32,
    /// Query words shorter than this (in characters) earn no token bonus.
    pub min_word_length: usize,
    /// Flat bonus for a clinic whose address or city contains the query.
    pub location_match: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_exact: 100,
            title_prefix: 80,
            title_contains: 60,
            subtitle_exact: 50,
            subtitle_contains: 30,
            description_contains: 20,
            title_word: 15,
            subtitle_word: 10,
            min_word_length: 3,
            location_match: 30,
        }
    }
}

/// The candidate strings a query is scored against. Any of them may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreFields<'a> {
    pub title: Option<&'a str>,
    pub subtitle: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl<'a> ScoreFields<'a> {
    pub fn title(title: &'a str) -> Self {
        Self {
            title: Some(title),
            ..Self::default()
        }
    }

    pub fn with_subtitle(mut self, subtitle: Option<&'a str>) -> Self {
        self.subtitle = subtitle;
        self
    }

    pub fn with_description(mut self, description: Option<&'a str>) -> Self {
        self.description = description;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score `fields` against `query`. All comparisons are case-insensitive.
    pub fn score(&self, query: &str, fields: ScoreFields<'_>) -> u32 {
        let w = &self.weights;
        let query = query.to_lowercase();
        let title = fields.title.map(str::to_lowercase);
        let subtitle = fields.subtitle.map(str::to_lowercase);
        let description = fields.description.map(str::to_lowercase);

        let mut score = 0;

        if let Some(title) = &title {
            if *title == query {
                score += w.title_exact;
            } else if title.starts_with(&query) {
                score += w.title_prefix;
            } else if title.contains(&query) {
                score += w.title_contains;
            }
        }

        if let Some(subtitle) = &subtitle {
            if *subtitle == query {
                score += w.subtitle_exact;
            } else if subtitle.contains(&query) {
                score += w.subtitle_contains;
            }
        }

        if description.as_deref().is_some_and(|d| d.contains(&query)) {
            score += w.description_contains;
        }

        for word in query.split(' ').filter(|word| word.chars().count() >= w.min_word_length) {
            if title.as_deref().is_some_and(|t| contains_token(t, word)) {
                score += w.title_word;
            }
            if subtitle.as_deref().is_some_and(|s| contains_token(s, word)) {
                score += w.subtitle_word;
            }
        }

        score
    }
}

/// True when `word` occurs in `haystack` bounded by spaces or the string edges.
fn contains_token(haystack: &str, word: &str) -> bool {
    haystack.split(' ').any(|token| token == word)
}
