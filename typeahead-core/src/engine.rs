use crate::config::AutocompleteConfig;
use crate::debounce::Debouncer;
use crate::error::WidgetError;
use crate::input::{self, Key, KeyOutcome, Pointer};
use crate::state_machine::{AutocompleteEvent, AutocompleteState, Command, FetchTicket, Snapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use typeahead_net::{FetchError, SuggestionSource};

/// Commands sent to the controller task.
/// The first group comes from the handle, the second from timers and lookups.
enum WidgetCommand {
    Input(String, oneshot::Sender<()>),
    SetValue(String, oneshot::Sender<()>),
    Key(Key, oneshot::Sender<KeyOutcome>),
    Pointer(Pointer, oneshot::Sender<()>),
    Focus(oneshot::Sender<()>),
    Blur(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<Snapshot>),
    Stop(oneshot::Sender<()>),

    DebounceFired(String),
    FetchDone(FetchTicket, Result<Vec<String>, FetchError>),
    BlurElapsed,
}

/// One autocomplete input.
///
/// The state lives in a dedicated task; this handle only sends it commands.
/// Every method waits until its command has been applied, so a snapshot
/// taken right after reflects it.
pub struct Autocomplete {
    cmd_tx: mpsc::UnboundedSender<WidgetCommand>,
    snapshot_rx: watch::Receiver<Snapshot>,
    config: AutocompleteConfig,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("config", &self.config)
            .finish()
    }
}

impl Autocomplete {
    /// Start the controller task. Must be called inside a tokio runtime.
    ///
    /// Returns the handle and the stream of upward events.
    pub fn start(
        config: AutocompleteConfig,
        initial_value: &str,
        source: Arc<dyn SuggestionSource>,
    ) -> (Self, mpsc::UnboundedReceiver<AutocompleteEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let state = AutocompleteState::new(&config, initial_value);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());

        let controller = Controller::new(state, &config, source, cmd_tx.clone(), event_tx, snapshot_tx);
        let task = tokio::spawn(controller.run(cmd_rx));

        tracing::debug!("Autocomplete started (min_chars={})", config.min_chars);

        (
            Self {
                cmd_tx,
                snapshot_rx,
                config,
                task,
            },
            event_rx,
        )
    }

    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    /// The user edited the text.
    pub async fn input(&self, text: &str) -> Result<(), WidgetError> {
        let text = text.to_string();
        self.request(|ack| WidgetCommand::Input(text, ack)).await
    }

    /// The parent changed the controlled value.
    pub async fn set_value(&self, value: &str) -> Result<(), WidgetError> {
        let value = value.to_string();
        self.request(|ack| WidgetCommand::SetValue(value, ack)).await
    }

    pub async fn key(&self, key: Key) -> Result<KeyOutcome, WidgetError> {
        self.request(|ack| WidgetCommand::Key(key, ack)).await
    }

    pub async fn pointer(&self, pointer: Pointer) -> Result<(), WidgetError> {
        self.request(|ack| WidgetCommand::Pointer(pointer, ack)).await
    }

    pub async fn focus(&self) -> Result<(), WidgetError> {
        self.request(WidgetCommand::Focus).await
    }

    pub async fn blur(&self) -> Result<(), WidgetError> {
        self.request(WidgetCommand::Blur).await
    }

    /// State after every command sent so far has been applied.
    pub async fn snapshot(&self) -> Result<Snapshot, WidgetError> {
        self.request(WidgetCommand::Snapshot).await
    }

    /// Subscribe to state changes, e.g. to redraw.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Tear down: cancels timers and makes late lookups land nowhere.
    pub async fn shutdown(mut self) -> Result<(), WidgetError> {
        self.request(WidgetCommand::Stop).await?;
        let _ = (&mut self.task).await;
        Ok(())
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> WidgetCommand,
    ) -> Result<R, WidgetError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.cmd_tx
            .send(make(ack_tx))
            .map_err(|_| WidgetError::Stopped)?;
        ack_rx.await.map_err(|_| WidgetError::Stopped)
    }
}

impl Drop for Autocomplete {
    fn drop(&mut self) {
        // Dropping the task drops its timers with it.
        self.task.abort();
    }
}

// ────────────────────────────────────────────────────────────────
// Controller task
// ────────────────────────────────────────────────────────────────

struct Controller {
    state: AutocompleteState,
    source: Arc<dyn SuggestionSource>,
    fetch_timer: Debouncer<String>,
    blur_timer: Debouncer<()>,
    cmd_tx: mpsc::UnboundedSender<WidgetCommand>,
    event_tx: mpsc::UnboundedSender<AutocompleteEvent>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl Controller {
    fn new(
        state: AutocompleteState,
        config: &AutocompleteConfig,
        source: Arc<dyn SuggestionSource>,
        cmd_tx: mpsc::UnboundedSender<WidgetCommand>,
        event_tx: mpsc::UnboundedSender<AutocompleteEvent>,
        snapshot_tx: watch::Sender<Snapshot>,
    ) -> Self {
        let fetch_timer = {
            let tx = cmd_tx.clone();
            Debouncer::new(config.debounce(), move |query: String| {
                let _ = tx.send(WidgetCommand::DebounceFired(query));
            })
        };
        let blur_timer = {
            let tx = cmd_tx.clone();
            Debouncer::new(config.blur_grace(), move |()| {
                let _ = tx.send(WidgetCommand::BlurElapsed);
            })
        };

        Self {
            state,
            source,
            fetch_timer,
            blur_timer,
            cmd_tx,
            event_tx,
            snapshot_tx,
        }
    }

    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<WidgetCommand>) {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                WidgetCommand::Input(text, ack) => {
                    let commands = self.state.input(&text);
                    self.apply(commands);
                    let _ = ack.send(());
                }
                WidgetCommand::SetValue(value, ack) => {
                    let commands = self.state.sync_controlled(&value);
                    self.apply(commands);
                    let _ = ack.send(());
                }
                WidgetCommand::Key(key, ack) => {
                    let (outcome, commands) = input::apply_key(&mut self.state, key);
                    self.apply(commands);
                    let _ = ack.send(outcome);
                }
                WidgetCommand::Pointer(pointer, ack) => {
                    let commands = input::apply_pointer(&mut self.state, pointer);
                    self.apply(commands);
                    let _ = ack.send(());
                }
                WidgetCommand::Focus(ack) => {
                    let commands = self.state.focus();
                    self.apply(commands);
                    let _ = ack.send(());
                }
                WidgetCommand::Blur(ack) => {
                    let commands = self.state.blur();
                    self.apply(commands);
                    let _ = ack.send(());
                }
                WidgetCommand::Snapshot(reply) => {
                    let _ = reply.send(self.state.snapshot());
                }
                WidgetCommand::Stop(ack) => {
                    let commands = self.state.teardown();
                    self.apply(commands);
                    let _ = ack.send(());
                    break;
                }
                WidgetCommand::DebounceFired(query) => {
                    if let Some(ticket) = self.state.begin_fetch(&query) {
                        self.spawn_fetch(ticket);
                    }
                    self.publish();
                }
                WidgetCommand::FetchDone(ticket, result) => {
                    if self.state.complete_fetch(ticket, result) {
                        self.publish();
                    }
                }
                WidgetCommand::BlurElapsed => {
                    let commands = self.state.blur_elapsed();
                    self.apply(commands);
                }
            }
        }

        tracing::debug!("Autocomplete controller stopped");
    }

    /// Fire-and-forget lookup; the result comes back tagged with its ticket.
    fn spawn_fetch(&self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.cmd_tx.clone();

        tracing::debug!("Fetching suggestions for {:?} (generation {})", ticket.query, ticket.generation);

        tokio::spawn(async move {
            let result = source.suggest(&ticket.query).await;
            // The controller may be gone; then the result has nowhere to go.
            let _ = tx.send(WidgetCommand::FetchDone(ticket, result));
        });
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::ScheduleFetch(query) => self.fetch_timer.call(query),
                Command::CancelFetch => self.fetch_timer.cancel(),
                Command::ScheduleBlur => self.blur_timer.call(()),
                Command::CancelBlur => self.blur_timer.cancel(),
                Command::Emit(event) => {
                    let _ = self.event_tx.send(event);
                }
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let next = self.state.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
