// typeahead-core/src/config.rs
//
// Input properties of one autocomplete instance.
// Everything except the controlled value and the endpoint lives here;
// the endpoint belongs to the suggestion source.

use crate::error::WidgetError;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    /// Shown in the input while the query is empty
    pub placeholder: String,
    /// Queries shorter than this (after trimming) never fetch. Zero lets an
    /// empty query fetch too.
    pub min_chars: usize,
    /// Quiet period after the last keystroke before fetching
    pub debounce_ms: u64,
    /// How long a blur waits before closing, so a pointer-down can land first
    pub blur_grace_ms: u64,
    /// A disabled input ignores every interaction
    pub disabled: bool,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            placeholder: "Start typing a country...".to_string(),
            min_chars: typeahead_net::DEFAULT_MIN_CHARS,
            debounce_ms: 300,
            blur_grace_ms: 150,
            disabled: false,
        }
    }
}

impl AutocompleteConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, WidgetError> {
        serde_json::from_str(text).map_err(|e| WidgetError::InvalidConfig(e.to_string()))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}
