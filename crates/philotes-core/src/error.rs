//! Error types for Philotes.

use thiserror::Error;

/// Workspace-wide error type.
#[derive(Debug, Error)]
pub enum PhilotesError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Notify error: {0}")]
    Notify(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PhilotesError>;
