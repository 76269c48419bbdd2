use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use typeahead_core::{
    Autocomplete, AutocompleteConfig, AutocompleteEvent, FetchError, Key, Phase, Pointer,
    SuggestionSource, WidgetError,
};

// ============================================================================
// Test source: canned replies with per-query latency
// ============================================================================

type Reply = (u64, Result<Vec<&'static str>, u16>);

#[derive(Default)]
struct ScriptedSource {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self::default()
    }

    fn reply(mut self, query: &str, delay_ms: u64, items: &[&'static str]) -> Self {
        self.replies
            .insert(query.to_string(), (delay_ms, Ok(items.to_vec())));
        self
    }

    fn fail(mut self, query: &str, status: u16) -> Self {
        self.replies.insert(query.to_string(), (0, Err(status)));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionSource for ScriptedSource {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError> {
        self.calls.lock().unwrap().push(query.to_string());
        let (delay, reply) = self
            .replies
            .get(query)
            .cloned()
            .unwrap_or((0, Ok(Vec::new())));
        tokio::time::sleep(Duration::from_millis(delay)).await;
        reply
            .map(|items| items.into_iter().map(String::from).collect())
            .map_err(FetchError::Status)
    }
}

fn start(
    source: &Arc<ScriptedSource>,
) -> (
    Autocomplete,
    tokio::sync::mpsc::UnboundedReceiver<AutocompleteEvent>,
) {
    Autocomplete::start(AutocompleteConfig::default(), "", source.clone())
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Long enough for any debounce, lookup and grace timer in these tests.
async fn settle() {
    sleep_ms(2_000).await;
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<AutocompleteEvent>) -> Vec<AutocompleteEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

fn fr_source() -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new().reply("fr", 0, &["France", "French Polynesia"]))
}

// ============================================================================
// Debounce & minimum length
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_typing_burst_issues_one_lookup() {
    let source = Arc::new(ScriptedSource::new().reply("fra", 0, &["France"]));
    let (ac, _events) = start(&source);

    for text in ["f", "fr", "fra"] {
        ac.input(text).await.unwrap();
        sleep_ms(50).await;
    }
    settle().await;

    assert_eq!(source.calls(), vec!["fra"]);
    let snap = ac.snapshot().await.unwrap();
    assert!(snap.open);
    assert_eq!(snap.suggestions, vec!["France"]);
}

#[tokio::test(start_paused = true)]
async fn test_short_query_never_fetches() {
    let source = fr_source();
    let (ac, _events) = start(&source);

    ac.input("f").await.unwrap();
    ac.input(" f  ").await.unwrap();
    settle().await;

    assert!(source.calls().is_empty());
    let snap = ac.snapshot().await.unwrap();
    assert!(!snap.open);
    assert_eq!(snap.phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_deleting_below_min_closes() {
    let source = fr_source();
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;
    assert!(ac.snapshot().await.unwrap().open);

    ac.input("f").await.unwrap();
    let snap = ac.snapshot().await.unwrap();
    assert!(!snap.open);
    assert!(snap.suggestions.is_empty());
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_early_response_never_wins() {
    let source = Arc::new(
        ScriptedSource::new()
            .reply("fr", 500, &["France", "French Polynesia", "French Guiana"])
            .reply("fra", 10, &["France"]),
    );
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    sleep_ms(350).await; // "fr" lookup now in flight until t=800
    ac.input("fra").await.unwrap();
    sleep_ms(350).await; // "fra" fired at 650, resolved at 660

    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.suggestions, vec!["France"]);
    assert!(snap.open);

    settle().await;
    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.suggestions, vec!["France"]);
    assert_eq!(source.calls(), vec!["fr", "fra"]);
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_spans_lookup() {
    let source = Arc::new(ScriptedSource::new().reply("fr", 500, &["France"]));
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    sleep_ms(400).await;
    assert!(ac.snapshot().await.unwrap().loading);

    settle().await;
    assert!(!ac.snapshot().await.unwrap().loading);
}

// ============================================================================
// Controlled value
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_controlled_reset_blocks_pending_lookup() {
    let source = Arc::new(
        ScriptedSource::new()
            .reply("ge", 0, &["Germany", "Georgia"])
            .reply("geo", 0, &["Georgia"]),
    );
    let (ac, _events) = start(&source);

    ac.input("ge").await.unwrap();
    settle().await;
    assert!(ac.snapshot().await.unwrap().open);

    ac.input("geo").await.unwrap();
    ac.set_value("France").await.unwrap();

    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.query, "France");
    assert!(!snap.open);

    settle().await;
    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.query, "France");
    assert_eq!(snap.value, "France");
    assert!(!snap.open);
    assert!(snap.suggestions.is_empty());
    assert_eq!(source.calls(), vec!["ge"]);
}

#[tokio::test(start_paused = true)]
async fn test_controlled_reset_discards_in_flight() {
    let source = Arc::new(ScriptedSource::new().reply("ge", 500, &["Germany"]));
    let (ac, _events) = start(&source);

    ac.input("ge").await.unwrap();
    sleep_ms(400).await;
    ac.set_value("France").await.unwrap();
    settle().await;

    let snap = ac.snapshot().await.unwrap();
    assert!(!snap.open);
    assert!(snap.suggestions.is_empty());
    assert!(!snap.loading);
}

#[tokio::test(start_paused = true)]
async fn test_parent_echo_keeps_lookup() {
    let source = fr_source();
    let (ac, mut events) = start(&source);

    ac.input("fr").await.unwrap();
    // Parent feeds the typed value straight back in.
    if let Some(ev) = events.recv().await {
        ac.set_value(ev.value()).await.unwrap();
    }
    settle().await;

    let snap = ac.snapshot().await.unwrap();
    assert!(snap.open);
    assert_eq!(snap.value, "fr");
}

// ============================================================================
// Keyboard & pointer
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_keyboard_selection_round_trip() {
    let source = fr_source();
    let (ac, mut events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;

    ac.key(Key::ArrowDown).await.unwrap();
    ac.key(Key::ArrowDown).await.unwrap();
    assert_eq!(ac.snapshot().await.unwrap().active, Some(1));
    let outcome = ac.key(Key::Enter).await.unwrap();
    assert!(outcome.prevent_default);

    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.query, "French Polynesia");
    assert_eq!(snap.value, "French Polynesia");
    assert!(!snap.open);
    assert!(snap.suggestions.is_empty());

    assert_eq!(
        drain(&mut events),
        vec![
            AutocompleteEvent::Changed("fr".into()),
            AutocompleteEvent::Committed("French Polynesia".into()),
        ]
    );

    // The commit must not trigger a fresh lookup for the chosen text.
    settle().await;
    assert_eq!(source.calls(), vec!["fr"]);
    assert!(!ac.snapshot().await.unwrap().open);
}

#[tokio::test(start_paused = true)]
async fn test_escape_only_closes() {
    let source = fr_source();
    let (ac, mut events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;
    let before = ac.snapshot().await.unwrap();
    assert!(before.open);

    let outcome = ac.key(Key::Escape).await.unwrap();
    assert!(outcome.handled);

    let after = ac.snapshot().await.unwrap();
    assert!(!after.open);
    assert_eq!(after.query, before.query);
    assert_eq!(after.value, before.value);
    assert_eq!(drain(&mut events), vec![AutocompleteEvent::Changed("fr".into())]);
}

#[tokio::test(start_paused = true)]
async fn test_keys_ignored_while_fetching() {
    let source = Arc::new(ScriptedSource::new().reply("fr", 500, &["France"]));
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    let outcome = ac.key(Key::Enter).await.unwrap();
    assert!(!outcome.handled);
    assert!(!outcome.prevent_default);
    assert_eq!(ac.snapshot().await.unwrap().value, "");
}

#[tokio::test(start_paused = true)]
async fn test_pointer_selection_beats_blur() {
    let source = fr_source();
    let (ac, mut events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;

    ac.blur().await.unwrap();
    ac.pointer(Pointer::Hover(1)).await.unwrap();
    ac.pointer(Pointer::Down(1)).await.unwrap();
    settle().await;

    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.value, "French Polynesia");
    assert_eq!(
        drain(&mut events).last(),
        Some(&AutocompleteEvent::Committed("French Polynesia".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_blur_closes_after_grace() {
    let source = fr_source();
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;

    ac.blur().await.unwrap();
    sleep_ms(100).await;
    assert!(ac.snapshot().await.unwrap().open);
    sleep_ms(100).await;
    let snap = ac.snapshot().await.unwrap();
    assert!(!snap.open);
    assert_eq!(snap.query, "fr");
}

#[tokio::test(start_paused = true)]
async fn test_focus_cancels_blur() {
    let source = fr_source();
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;

    ac.blur().await.unwrap();
    ac.focus().await.unwrap();
    settle().await;
    assert!(ac.snapshot().await.unwrap().open);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_degrades_quietly() {
    let source = Arc::new(
        ScriptedSource::new()
            .fail("fr", 500)
            .reply("fra", 0, &["France"]),
    );
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    settle().await;
    let snap = ac.snapshot().await.unwrap();
    assert!(!snap.open);
    assert!(!snap.loading);
    assert!(snap.suggestions.is_empty());
    assert_eq!(snap.query, "fr");

    // Typing on retries naturally.
    ac.input("fra").await.unwrap();
    settle().await;
    assert!(ac.snapshot().await.unwrap().open);
}

#[tokio::test(start_paused = true)]
async fn test_empty_result_stays_closed() {
    let source = Arc::new(ScriptedSource::new());
    let (ac, _events) = start(&source);

    ac.input("qq").await.unwrap();
    settle().await;
    let snap = ac.snapshot().await.unwrap();
    assert!(!snap.open);
    assert_eq!(snap.phase, Phase::Closed);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_watch_reports_open() {
    let source = fr_source();
    let (ac, _events) = start(&source);
    let mut rx = ac.watch();

    ac.input("fr").await.unwrap();
    let snap = rx.wait_for(|s| s.open).await.unwrap().clone();
    assert_eq!(snap.suggestions.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drops_late_results() {
    let source = Arc::new(ScriptedSource::new().reply("fr", 500, &["France"]));
    let (ac, _events) = start(&source);
    let rx = ac.watch();

    ac.input("fr").await.unwrap();
    sleep_ms(400).await;
    ac.shutdown().await.unwrap();
    settle().await;

    assert!(!rx.borrow().open);
    assert_eq!(source.calls(), vec!["fr"]);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_debounce() {
    let source = fr_source();
    let (ac, _events) = start(&source);

    ac.input("fr").await.unwrap();
    drop(ac);
    settle().await;

    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disabled_input_is_inert() {
    let source = fr_source();
    let config = AutocompleteConfig {
        disabled: true,
        ..AutocompleteConfig::default()
    };
    let (ac, mut events) = Autocomplete::start(config, "Chad", source.clone());

    ac.input("fr").await.unwrap();
    settle().await;

    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.query, "Chad");
    assert!(source.calls().is_empty());
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_disabled_input_follows_parent_value() {
    let source = fr_source();
    let config = AutocompleteConfig {
        disabled: true,
        ..AutocompleteConfig::default()
    };
    let (ac, mut events) = Autocomplete::start(config, "Chad", source.clone());

    ac.set_value("Peru").await.unwrap();
    settle().await;

    let snap = ac.snapshot().await.unwrap();
    assert_eq!(snap.query, "Peru");
    assert_eq!(snap.value, "Peru");
    assert!(!snap.open);
    assert!(source.calls().is_empty());
    assert!(drain(&mut events).is_empty());
    assert!(ac.config().disabled);
}

#[tokio::test(start_paused = true)]
async fn test_zero_min_chars_lists_on_empty_input() {
    let source = fr_source();
    let config = AutocompleteConfig {
        min_chars: 0,
        ..AutocompleteConfig::default()
    };
    let (ac, _events) = Autocomplete::start(config, "", source.clone());

    ac.input("").await.unwrap();
    settle().await;

    assert_eq!(source.calls(), vec![String::new()]);
}

// ============================================================================
// AutocompleteConfig Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = AutocompleteConfig::default();
    assert_eq!(config.min_chars, 2);
    assert_eq!(config.debounce(), Duration::from_millis(300));
    assert_eq!(config.blur_grace(), Duration::from_millis(150));
    assert!(!config.disabled);
}

#[test]
fn test_config_from_partial_json() {
    let config = AutocompleteConfig::from_json(r#"{ "min_chars": 3, "placeholder": "Country" }"#)
        .unwrap();
    assert_eq!(config.min_chars, 3);
    assert_eq!(config.placeholder, "Country");
    assert_eq!(config.debounce_ms, 300);
}

#[test]
fn test_config_rejects_bad_json() {
    let err = AutocompleteConfig::from_json("{ min_chars: }").unwrap_err();
    assert!(matches!(err, WidgetError::InvalidConfig(_)));
    assert!(AutocompleteConfig::from_json(r#"{ "min_chars": "two" }"#).is_err());
}

#[test]
fn test_config_accepts_zero_min_chars() {
    let config = AutocompleteConfig::from_json(r#"{ "min_chars": 0 }"#).unwrap();
    assert_eq!(config.min_chars, 0);
}
