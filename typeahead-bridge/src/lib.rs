//! Typeahead Bridge library target.
//!
//! Exposes the key mapping and rendering for integration tests. The binary
//! entry point is in `main.rs`.

pub mod keymap;
pub mod view;
