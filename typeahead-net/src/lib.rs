//! # Typeahead Net
//!
//! Where suggestions come from.
//! The engine only sees `SuggestionSource`; this crate supplies the HTTP
//! fetcher used in production and an in-memory list for offline runs.

use async_trait::async_trait;
use thiserror::Error;

pub mod fetcher;
pub mod local;
pub mod parse;

pub use fetcher::{FetcherConfig, SuggestionFetcher};
pub use local::StaticSource;

/// Default minimum number of characters before a lookup is issued.
pub const DEFAULT_MIN_CHARS: usize = 2;

/// Default cap on the number of suggestions returned by one lookup.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// The interface for anything that can answer a suggestion query.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Look up display strings for `query`.
    ///
    /// Queries shorter than the source's minimum length resolve to an empty
    /// list without doing any I/O.
    async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError>;
}

/// Why a lookup produced nothing.
///
/// A malformed body is not in here on purpose: it is coerced to an empty list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid suggestion endpoint `{0}`")]
    InvalidEndpoint(String),

    #[error("suggestion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("suggestion endpoint returned HTTP {0}")]
    Status(u16),
}

/// Count characters of the trimmed query against `min_chars`.
pub fn below_min_chars(query: &str, min_chars: usize) -> bool {
    query.trim().chars().count() < min_chars
}
