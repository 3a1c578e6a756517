//! Error types for the core library

use thiserror::Error;

/// Fallback message when the server rejects a request without saying why.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Transport { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a transport error from a server-supplied message, falling back
    /// to the generic one when the server said nothing useful.
    pub fn transport(message: impl Into<Option<String>>) -> Self {
        Self::Transport {
            message: message
                .into()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Rules shared between the client-side coordinator and the repositories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    TitleEmpty,

    #[error("Title cannot exceed 200 characters")]
    TitleTooLong,

    #[error("Description cannot exceed 2000 characters")]
    DescriptionTooLong,

    #[error("Priority must be between 1 and 9")]
    PriorityOutOfRange,

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),
}
