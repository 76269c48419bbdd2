//! Keyboard and pointer dispatch onto the state machine.
//!
//! Only the navigation keys are handled here. Printable characters are
//! ordinary text editing and reach the state machine through `input`.
//! Everything is a no-op unless the dropdown is open.

use crate::state_machine::{AutocompleteState, Command};

/// Navigation keys the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    /// Anything else; left to normal text input.
    Other,
}

/// Pointer activity over a dropdown row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    /// Moved over the row at this index.
    Hover(usize),
    /// Pressed on the row at this index. Fires before the input's blur.
    Down(usize),
}

/// What the adapter did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The key changed the dropdown.
    pub handled: bool,
    /// The host should swallow the key's default action.
    pub prevent_default: bool,
}

pub fn apply_key(state: &mut AutocompleteState, key: Key) -> (KeyOutcome, Vec<Command>) {
    if !state.is_open() {
        return (KeyOutcome::default(), Vec::new());
    }

    match key {
        Key::ArrowDown => (handled(state.highlight_next()), Vec::new()),
        Key::ArrowUp => (handled(state.highlight_prev()), Vec::new()),
        Key::Enter => match state.active_or_first() {
            Some(index) => {
                let commands = state.select(index);
                (
                    KeyOutcome {
                        handled: true,
                        prevent_default: true,
                    },
                    commands,
                )
            }
            None => (KeyOutcome::default(), Vec::new()),
        },
        Key::Escape => (handled(state.close()), Vec::new()),
        Key::Other => (KeyOutcome::default(), Vec::new()),
    }
}

pub fn apply_pointer(state: &mut AutocompleteState, pointer: Pointer) -> Vec<Command> {
    if !state.is_open() {
        return Vec::new();
    }

    match pointer {
        Pointer::Hover(index) => {
            state.highlight(index);
            Vec::new()
        }
        Pointer::Down(index) => state.select(index),
    }
}

fn handled(changed: bool) -> KeyOutcome {
    KeyOutcome {
        handled: changed,
        prevent_default: false,
    }
}
