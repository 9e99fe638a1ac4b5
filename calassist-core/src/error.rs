//! Error types for calassist.

use std::path::PathBuf;

use thiserror::Error;

/// Structural problems with an event's fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Event title is required")]
    MissingTitle,

    #[error("End time must be after start time")]
    InvalidTimeOrder,

    #[error("Could not interpret timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Failures reading or writing the event file.
#[derive(Error, Debug)]
pub enum StoreIoError {
    #[error("Failed to load events from {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("Failed to persist events to {path}: {reason}")]
    PersistFailed { path: PathBuf, reason: String },
}

/// Errors that can occur in calassist operations.
#[derive(Error, Debug)]
pub enum CalAssistError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] StoreIoError),

    #[error("Remote calendar unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalAssistError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CalAssistError::Validation(ValidationError::MissingTitle) => "missing_title",
            CalAssistError::Validation(ValidationError::InvalidTimeOrder) => "invalid_time_order",
            CalAssistError::Validation(ValidationError::InvalidTimestamp(_)) => {
                "invalid_timestamp"
            }
            CalAssistError::NotFound(_) => "not_found",
            CalAssistError::Io(_) => "io",
            CalAssistError::RemoteUnavailable(_) | CalAssistError::Provider(_) => {
                "remote_unavailable"
            }
            CalAssistError::Config(_) => "config",
            CalAssistError::Serialization(_) => "serialization",
        }
    }
}

/// Result type alias for calassist operations.
pub type CalAssistResult<T> = Result<T, CalAssistError>;
