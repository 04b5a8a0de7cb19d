//! Error types for editor operations.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Element not found in the store.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An operation that targets the selection was issued with nothing selected.
    #[error("No element selected")]
    NoSelection,

    /// User-supplied input was rejected (wrong file type, empty text, ...).
    ///
    /// The message is suitable for showing to the user as-is.
    #[error("{0}")]
    InvalidInput(String),

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Design document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a design document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// Returns true if the error was caused by user input and should be
    /// reported back without further logging.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NoSelection)
    }
}
