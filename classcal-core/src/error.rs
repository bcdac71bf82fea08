//! Error types for classcal.

use thiserror::Error;

use crate::class_event::ClassId;

/// Errors that can occur while loading, selecting and exporting classes.
#[derive(Error, Debug)]
pub enum ClassCalError {
    /// The user asked for something that cannot be exported as is
    /// (empty selection, no reminders). Recoverable by changing the input.
    #[error("{0}")]
    Validation(String),

    /// A single class record carries an unusable date or time.
    #[error("Class {id}: {reason}")]
    DataQuality { id: ClassId, reason: String },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    Timezone(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClassCalError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClassCalError::Validation(message.into())
    }

    /// True for errors the user fixes by changing the selection or reminders.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClassCalError::Validation(_))
    }
}

/// Result type alias for classcal operations.
pub type ClassCalResult<T> = Result<T, ClassCalError>;
