//! The interaction state machine.
//!
//! Owns the query, the suggestion list, the highlighted row, the open flag
//! and the controlled value. It does no I/O and starts no timers: each
//! transition returns the `Command`s the controller must carry out.
//!
//! Fetch ordering rests on a generation counter. `begin_fetch` bumps it and
//! hands out a `FetchTicket`; `complete_fetch` applies a result only while
//! its ticket still carries the current generation. Anything that makes an
//! in-flight lookup irrelevant (short query, selection, parent reset, blur,
//! teardown) bumps the generation too.

use crate::config::AutocompleteConfig;
use serde::Serialize;
use typeahead_net::{FetchError, below_min_chars};

/// Coarse lifecycle of the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// Query empty or below the minimum length; nothing shown.
    #[default]
    Idle,
    /// A lookup is scheduled or in flight.
    Fetching,
    /// Suggestions visible.
    Open,
    /// Hidden, query and (possibly) suggestions retained.
    Closed,
}

/// Reported upward to the owner of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteEvent {
    /// The user typed; the value is provisional.
    Changed(String),
    /// The user picked a suggestion.
    Committed(String),
}

impl AutocompleteEvent {
    /// The new value, whichever way it arrived.
    pub fn value(&self) -> &str {
        match self {
            AutocompleteEvent::Changed(v) | AutocompleteEvent::Committed(v) => v,
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// (Re)arm the fetch debouncer with this trimmed query.
    ScheduleFetch(String),
    /// Disarm the fetch debouncer.
    CancelFetch,
    /// Start the blur grace timer.
    ScheduleBlur,
    CancelBlur,
    Emit(AutocompleteEvent),
}

/// Identifies one issued lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: String,
}

/// Read-only copy of the state, for rendering and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Snapshot {
    pub query: String,
    pub value: String,
    pub suggestions: Vec<String>,
    /// Highlighted row; `None` is "no highlight".
    pub active: Option<usize>,
    pub open: bool,
    pub loading: bool,
    pub phase: Phase,
}

#[derive(Debug)]
pub struct AutocompleteState {
    min_chars: usize,
    disabled: bool,

    query: String,
    value: String,
    suggestions: Vec<String>,
    /// Trimmed query the current suggestions answer
    suggestions_for: String,
    active: Option<usize>,
    open: bool,
    loading: bool,
    phase: Phase,

    generation: u64,
    fetch_scheduled: bool,
    suppress_next_fetch: bool,
    torn_down: bool,
}

impl AutocompleteState {
    pub fn new(config: &AutocompleteConfig, initial_value: &str) -> Self {
        Self {
            min_chars: config.min_chars,
            disabled: config.disabled,
            query: initial_value.to_string(),
            value: initial_value.to_string(),
            suggestions: Vec::new(),
            suggestions_for: String::new(),
            active: None,
            open: false,
            loading: false,
            phase: Phase::Idle,
            generation: 0,
            fetch_scheduled: false,
            suppress_next_fetch: false,
            torn_down: false,
        }
    }

    // ────────────────────────────────────────────────────────────────
    // Accessors
    // ────────────────────────────────────────────────────────────────

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            query: self.query.clone(),
            value: self.value.clone(),
            suggestions: self.suggestions.clone(),
            active: self.active,
            open: self.open,
            loading: self.loading,
            phase: self.phase,
        }
    }

    // ────────────────────────────────────────────────────────────────
    // Transitions
    // ────────────────────────────────────────────────────────────────

    /// The user edited the text.
    pub fn input(&mut self, text: &str) -> Vec<Command> {
        if self.inert() {
            return Vec::new();
        }

        self.query = text.to_string();
        // Fresh typing replaces whatever the debouncer held.
        self.suppress_next_fetch = false;

        let mut commands = vec![Command::Emit(AutocompleteEvent::Changed(text.to_string()))];

        if below_min_chars(&self.query, self.min_chars) {
            self.invalidate();
            self.clear_list();
            self.fetch_scheduled = false;
            self.phase = Phase::Idle;
            commands.push(Command::CancelFetch);
        } else {
            self.open = false;
            self.active = None;
            self.fetch_scheduled = true;
            self.phase = Phase::Fetching;
            commands.push(Command::ScheduleFetch(self.query.trim().to_string()));
        }

        commands
    }

    /// The debouncer fired for `query`. Returns a ticket when a lookup
    /// should actually be issued.
    pub fn begin_fetch(&mut self, query: &str) -> Option<FetchTicket> {
        if self.inert() {
            return None;
        }

        if std::mem::take(&mut self.suppress_next_fetch) {
            tracing::debug!("Suppressed fetch for {:?} after controlled reset", query);
            return None;
        }
        // An outdated firing leaves the newer timer's flag alone.
        if query != self.query.trim() || below_min_chars(query, self.min_chars) {
            tracing::trace!("Dropping debounced fetch for outdated query {:?}", query);
            return None;
        }
        self.fetch_scheduled = false;

        self.generation += 1;
        self.loading = true;
        self.phase = Phase::Fetching;

        Some(FetchTicket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    /// A lookup finished. Returns whether the result was applied.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<String>, FetchError>,
    ) -> bool {
        if self.torn_down || ticket.generation != self.generation {
            tracing::trace!(
                "Discarding stale suggestions for {:?} (generation {} < {})",
                ticket.query,
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(list) if !list.is_empty() => {
                self.suggestions = list;
                self.suggestions_for = ticket.query;
                self.active = None;
                self.open = true;
                self.phase = Phase::Open;
            }
            Ok(_) => {
                self.clear_list();
                self.phase = Phase::Closed;
            }
            Err(e) => {
                tracing::warn!("Suggestion lookup for {:?} failed: {}", ticket.query, e);
                self.clear_list();
                self.phase = Phase::Closed;
            }
        }
        true
    }

    /// The parent pushed a new controlled value.
    pub fn sync_controlled(&mut self, value: &str) -> Vec<Command> {
        if self.torn_down || value == self.value {
            return Vec::new();
        }
        self.value = value.to_string();

        // The parent echoing what was just typed is not a reset.
        if self.value == self.query {
            return Vec::new();
        }

        self.query = self.value.clone();
        self.invalidate();
        self.clear_list();
        if std::mem::take(&mut self.fetch_scheduled) {
            self.suppress_next_fetch = true;
        }
        self.phase = if below_min_chars(&self.query, self.min_chars) {
            Phase::Idle
        } else {
            Phase::Closed
        };

        vec![Command::CancelFetch]
    }

    /// Pick the suggestion at `index`.
    pub fn select(&mut self, index: usize) -> Vec<Command> {
        if self.inert() {
            return Vec::new();
        }
        match self.suggestions.get(index) {
            Some(chosen) => {
                let chosen = chosen.clone();
                self.commit(chosen)
            }
            None => Vec::new(),
        }
    }

    fn commit(&mut self, chosen: String) -> Vec<Command> {
        self.query = chosen.clone();
        self.value = chosen.clone();
        self.invalidate();
        self.clear_list();
        self.fetch_scheduled = false;
        self.suppress_next_fetch = false;
        self.phase = Phase::Closed;

        vec![
            Command::CancelFetch,
            Command::CancelBlur,
            Command::Emit(AutocompleteEvent::Committed(chosen)),
        ]
    }

    /// Hide the dropdown, keeping query, value and list. Returns whether
    /// anything changed.
    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.active = None;
        self.phase = Phase::Closed;
        true
    }

    /// Focus left the input; closing waits for the grace period.
    pub fn blur(&mut self) -> Vec<Command> {
        if self.inert() {
            return Vec::new();
        }
        vec![Command::ScheduleBlur]
    }

    /// The blur grace period ran out without a selection.
    pub fn blur_elapsed(&mut self) -> Vec<Command> {
        if self.inert() {
            return Vec::new();
        }
        self.close();

        // A lookup landing after focus is gone must not pop the list open.
        let mut commands = Vec::new();
        if self.loading || self.fetch_scheduled {
            self.invalidate();
            // A timer that already fired is still queued behind us.
            self.suppress_next_fetch = std::mem::take(&mut self.fetch_scheduled);
            if self.phase == Phase::Fetching {
                self.phase = Phase::Closed;
            }
            commands.push(Command::CancelFetch);
        }
        commands
    }

    /// Focus came back. Reopens a retained list that still matches the query.
    pub fn focus(&mut self) -> Vec<Command> {
        if self.inert() {
            return Vec::new();
        }
        if !self.open
            && self.phase == Phase::Closed
            && !self.suggestions.is_empty()
            && self.suggestions_for == self.query.trim()
        {
            self.open = true;
            self.active = None;
            self.phase = Phase::Open;
        }
        vec![Command::CancelBlur]
    }

    /// The owner is going away. Nothing is applied after this.
    pub fn teardown(&mut self) -> Vec<Command> {
        self.torn_down = true;
        self.invalidate();
        self.open = false;
        vec![Command::CancelFetch, Command::CancelBlur]
    }

    // ────────────────────────────────────────────────────────────────
    // Highlight movement (driven by the input adapter)
    // ────────────────────────────────────────────────────────────────

    /// Move the highlight down one row, stopping at the last row.
    pub fn highlight_next(&mut self) -> bool {
        if !self.open || self.suggestions.is_empty() {
            return false;
        }
        let last = self.suggestions.len() - 1;
        self.active = Some(match self.active {
            None => 0,
            Some(i) => (i + 1).min(last),
        });
        true
    }

    /// Move the highlight up one row, stopping at the first row.
    pub fn highlight_prev(&mut self) -> bool {
        if !self.open || self.suggestions.is_empty() {
            return false;
        }
        self.active = Some(self.active.map_or(0, |i| i.saturating_sub(1)));
        true
    }

    pub fn highlight(&mut self, index: usize) -> bool {
        if !self.open || index >= self.suggestions.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Row Enter would pick: the highlighted one, else the first.
    pub fn active_or_first(&self) -> Option<usize> {
        if !self.open || self.suggestions.is_empty() {
            return None;
        }
        Some(self.active.unwrap_or(0))
    }

    // ────────────────────────────────────────────────────────────────
    // Helpers
    // ────────────────────────────────────────────────────────────────

    fn inert(&self) -> bool {
        self.torn_down || self.disabled
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    fn clear_list(&mut self) {
        self.suggestions.clear();
        self.suggestions_for.clear();
        self.active = None;
        self.open = false;
    }
}
