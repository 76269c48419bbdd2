//! Keyboard dispatch.
//!
//! Navigation keys go to the engine's input adapter; everything printable
//! is plain text editing. Ctrl+C quits (raw mode swallows SIGINT).
//! Tab stands in for focus moving away from the field and back.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use typeahead_core::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Navigation key for the dropdown
    Key(Key),
    Insert(char),
    Backspace,
    /// Ctrl+U: wipe the line
    Clear,
    ToggleFocus,
    Quit,
    Ignore,
}

pub fn map_key(event: KeyEvent) -> Action {
    // Windows reports releases too.
    if event.kind != KeyEventKind::Press && event.kind != KeyEventKind::Repeat {
        return Action::Ignore;
    }

    // ── Ctrl combos ──
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Action::Quit,
            KeyCode::Char('u') => Action::Clear,
            _ => Action::Ignore,
        };
    }

    // ── Bare keys ──
    match event.code {
        KeyCode::Down => Action::Key(Key::ArrowDown),
        KeyCode::Up => Action::Key(Key::ArrowUp),
        KeyCode::Enter => Action::Key(Key::Enter),
        KeyCode::Esc => Action::Key(Key::Escape),
        KeyCode::Tab | KeyCode::BackTab => Action::ToggleFocus,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) => Action::Insert(c),
        _ => Action::Ignore,
    }
}

/// Text after applying an editing action to `query`; `None` for non-edits.
pub fn edit_query(query: &str, action: Action) -> Option<String> {
    match action {
        Action::Insert(c) => {
            let mut next = query.to_string();
            next.push(c);
            Some(next)
        }
        Action::Backspace => {
            let mut next = query.to_string();
            next.pop()?;
            Some(next)
        }
        Action::Clear if !query.is_empty() => Some(String::new()),
        _ => None,
    }
}

/// A text edit ready to send: the next query, and whether the field has to
/// take focus back first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub query: String,
    pub refocus: bool,
}

/// `edit_query` for a field that may currently be blurred.
pub fn plan_edit(query: &str, action: Action, focused: bool) -> Option<Edit> {
    edit_query(query, action).map(|query| Edit {
        query,
        refocus: !focused,
    })
}
