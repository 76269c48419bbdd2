use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// The controller task has shut down; the handle is inert.
    #[error("autocomplete controller has stopped")]
    Stopped,

    #[error("invalid autocomplete config: {0}")]
    InvalidConfig(String),
}
