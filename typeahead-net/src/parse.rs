//! Defensive decoding of suggestion endpoint bodies.
//!
//! The endpoint is supposed to answer with a JSON array whose elements are
//! either plain strings or objects carrying a string `name`. Anything else
//! is dropped instead of failing the lookup.

use serde_json::Value;

/// Turn a raw response body into a flat list of display strings.
///
/// Never fails: invalid JSON and non-array bodies yield an empty list.
pub fn coerce_suggestions(body: &str, max_results: usize) -> Vec<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => coerce_value(value, max_results),
        Err(e) => {
            tracing::warn!("Suggestion body is not JSON, ignoring: {}", e);
            Vec::new()
        }
    }
}

/// Same as [`coerce_suggestions`] for an already parsed value.
pub fn coerce_value(value: Value, max_results: usize) -> Vec<String> {
    let Value::Array(items) = value else {
        tracing::warn!("Suggestion body is not an array, ignoring");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(display_name)
        .take(max_results)
        .collect()
}

fn display_name(item: Value) -> Option<String> {
    let name = match item {
        Value::String(s) => s,
        Value::Object(mut map) => match map.remove("name") {
            Some(Value::String(s)) => s,
            _ => return None,
        },
        _ => return None,
    };

    // Blank entries would render as empty dropdown rows.
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}
