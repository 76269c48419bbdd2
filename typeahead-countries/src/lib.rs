//! # Typeahead Countries
//!
//! The suggestion endpoint: `GET /api/countries?q=<text>` answers with a JSON
//! array of country names matching `q` case-insensitively.

pub mod dataset;
pub mod server;
pub mod service;

pub use dataset::{COUNTRIES, MAX_RESULTS, search};
pub use server::{DEFAULT_ADDR, serve};
