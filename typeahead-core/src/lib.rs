//! # Typeahead Core
//!
//! A text input with a dropdown of remote suggestions: debounced lookups,
//! stale responses dropped by generation, keyboard and pointer selection,
//! and a parent-controlled value that can override the typed text.

pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod input;
pub mod state_machine;

// Re-export the main struct so users can just use `typeahead_core::Autocomplete`
pub use engine::Autocomplete;

pub use config::AutocompleteConfig;
pub use debounce::Debouncer;
pub use error::WidgetError;
pub use input::{Key, KeyOutcome, Pointer};
pub use state_machine::{AutocompleteEvent, AutocompleteState, Phase, Snapshot};

// Sources are re-exported so front-ends need only one dependency for the basics.
pub use typeahead_net::{FetchError, StaticSource, SuggestionSource};
