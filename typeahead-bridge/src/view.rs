//! Plain-text rendering of a snapshot: the input line, then the dropdown.

use typeahead_core::{AutocompleteConfig, Snapshot};

/// Dropdown rows shown at once; the window follows the highlight.
pub const MAX_VISIBLE_ROWS: usize = 8;

pub const PROMPT: &str = "> ";

pub fn render_lines(snap: &Snapshot, config: &AutocompleteConfig, last_commit: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();

    let mut input_line = if snap.query.is_empty() {
        format!("{}{}", PROMPT, config.placeholder)
    } else {
        format!("{}{}", PROMPT, snap.query)
    };
    if config.disabled {
        input_line.push_str("  (disabled)");
    } else if snap.loading {
        input_line.push_str("  ...");
    }
    lines.push(input_line);

    if snap.open {
        let start = window_start(snap.active, snap.suggestions.len());
        let end = (start + MAX_VISIBLE_ROWS).min(snap.suggestions.len());

        for (index, name) in snap.suggestions[start..end].iter().enumerate() {
            let index = start + index;
            let marker = if snap.active == Some(index) { "▸ " } else { "  " };
            lines.push(format!("{}{}", marker, name));
        }

        let hidden = snap.suggestions.len() - (end - start);
        if hidden > 0 {
            lines.push(format!("  ({} more)", hidden));
        }
    }

    if let Some(value) = last_commit {
        lines.push(String::new());
        lines.push(format!("Selected: {}", value));
    }

    lines
}

/// Column of the caret on the input line.
pub fn cursor_column(snap: &Snapshot) -> u16 {
    let width = PROMPT.chars().count() + snap.query.chars().count();
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn window_start(active: Option<usize>, len: usize) -> usize {
    match active {
        Some(a) if a >= MAX_VISIBLE_ROWS => (a + 1 - MAX_VISIBLE_ROWS).min(len.saturating_sub(MAX_VISIBLE_ROWS)),
        _ => 0,
    }
}
