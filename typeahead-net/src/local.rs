use crate::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_CHARS, FetchError, SuggestionSource, below_min_chars};
use async_trait::async_trait;

/// A fixed, in-memory list answering by case-insensitive substring match.
#[derive(Debug, Clone)]
pub struct StaticSource {
    entries: Vec<String>,
    min_chars: usize,
    max_results: usize,
}

impl StaticSource {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            min_chars: DEFAULT_MIN_CHARS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_limits(mut self, min_chars: usize, max_results: usize) -> Self {
        self.min_chars = min_chars;
        self.max_results = max_results;
        self
    }

    pub fn matches(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if below_min_chars(query, self.min_chars) {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.to_lowercase().contains(&needle))
            .take(self.max_results)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SuggestionSource for StaticSource {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.matches(query))
    }
}
