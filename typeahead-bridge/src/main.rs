use anyhow::Context;
use crossterm::cursor::MoveTo;
use crossterm::event::{Event, EventStream};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use futures::StreamExt;
use std::io::Write;
use std::sync::Arc;

use typeahead_bridge::keymap::{self, Action};
use typeahead_bridge::view;
use typeahead_core::{Autocomplete, AutocompleteConfig, AutocompleteEvent, Snapshot};
use typeahead_net::{FetcherConfig, StaticSource, SuggestionFetcher, SuggestionSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Raw mode owns stdout; keep logs quiet on stderr.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let source = build_source(&config)?;

    terminal::enable_raw_mode().context("Failed to enter raw mode")?;
    let result = run(config, source).await;

    // Always restore the terminal, even if the loop failed.
    let mut stdout = std::io::stdout();
    let _ = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
    terminal::disable_raw_mode()?;

    if let Ok(Some(value)) = &result {
        println!("{}", value);
    }
    result.map(|_| ())
}

/// `TYPEAHEAD_CONFIG` may point at a JSON file with `AutocompleteConfig` fields.
fn load_config() -> anyhow::Result<AutocompleteConfig> {
    match std::env::var("TYPEAHEAD_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path))?;
            Ok(AutocompleteConfig::from_json(&text)?)
        }
        Err(_) => Ok(AutocompleteConfig::default()),
    }
}

/// HTTP when `TYPEAHEAD_ENDPOINT` is set, otherwise the built-in country list.
fn build_source(config: &AutocompleteConfig) -> anyhow::Result<Arc<dyn SuggestionSource>> {
    match std::env::var("TYPEAHEAD_ENDPOINT") {
        Ok(endpoint) => {
            let fetcher_config = FetcherConfig {
                endpoint: Some(endpoint),
                min_chars: config.min_chars,
                ..FetcherConfig::default()
            };
            Ok(Arc::new(SuggestionFetcher::new(fetcher_config)?))
        }
        Err(_) => {
            let source = StaticSource::new(typeahead_countries::COUNTRIES.iter().copied())
                .with_limits(config.min_chars, typeahead_countries::MAX_RESULTS);
            Ok(Arc::new(source))
        }
    }
}

/// Event loop. Returns the last committed value, if any.
async fn run(
    config: AutocompleteConfig,
    source: Arc<dyn SuggestionSource>,
) -> anyhow::Result<Option<String>> {
    let (autocomplete, mut events) = Autocomplete::start(config, "", source);
    let config = autocomplete.config().clone();
    let mut snapshots = autocomplete.watch();
    let mut keys = EventStream::new();
    let mut stdout = std::io::stdout();

    let mut focused = true;
    let mut last_commit: Option<String> = None;

    let initial = snapshots.borrow().clone();
    draw(&mut stdout, &initial, &config, last_commit.as_deref())?;

    loop {
        tokio::select! {
            maybe_event = keys.next() => {
                let Some(event) = maybe_event else { break };
                let Event::Key(key) = event? else { continue };

                let action = keymap::map_key(key);
                match action {
                    Action::Quit => break,
                    Action::Key(k) => {
                        autocomplete.key(k).await?;
                    }
                    Action::ToggleFocus => {
                        if focused {
                            autocomplete.blur().await?;
                        } else {
                            autocomplete.focus().await?;
                        }
                        focused = !focused;
                    }
                    Action::Ignore => {}
                    edit => {
                        let query = snapshots.borrow().query.clone();
                        if let Some(next) = keymap::plan_edit(&query, edit, focused) {
                            if next.refocus {
                                autocomplete.focus().await?;
                                focused = true;
                            }
                            autocomplete.input(&next.query).await?;
                        }
                    }
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            Some(event) = events.recv() => {
                if let AutocompleteEvent::Committed(value) = event {
                    last_commit = Some(value);
                }
            }
        }

        let snap = snapshots.borrow_and_update().clone();
        draw(&mut stdout, &snap, &config, last_commit.as_deref())?;
    }

    autocomplete.shutdown().await?;
    Ok(last_commit)
}

fn draw(
    out: &mut impl Write,
    snap: &Snapshot,
    config: &AutocompleteConfig,
    last_commit: Option<&str>,
) -> anyhow::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in view::render_lines(snap, config, last_commit).iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), Print(line))?;
    }
    queue!(out, MoveTo(view::cursor_column(snap), 0))?;
    out.flush()?;
    Ok(())
}
