//! Order submission error types.

use std::time::Duration;

use design_core::EditorError;
use design_renderer::RenderError;
use thiserror::Error;

/// Result type for order operations.
pub type OrderResult<T> = Result<T, OrderError>;

/// Errors that can occur while assembling or submitting an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The backend base URL is invalid.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, status, body).
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("failed to parse backend payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered but refused the request.
    #[error("{message}")]
    Rejected {
        /// Message from the backend, or a generic fallback.
        message: String,
    },

    /// No size has a positive quantity.
    #[error("Select a quantity for at least one size")]
    InvalidQuantities,

    /// Rendering the design failed.
    #[error("export failed: {0}")]
    Render(#[from] RenderError),

    /// The editor refused an operation.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The operation did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl OrderError {
    /// Build a rejection from an optional backend message.
    pub(crate) fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "The request could not be completed".to_string()),
        }
    }

    /// Message suitable for showing to the person editing the design.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The request timed out".to_string(),
            Self::Http(e) if e.is_connect() => "Network connection error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_backend_message() {
        let err = OrderError::rejected(Some("Out of stock".to_string()));
        assert_eq!(err.user_message(), "Out of stock");
    }

    #[test]
    fn test_rejected_falls_back_on_blank() {
        let err = OrderError::rejected(Some("  ".to_string()));
        assert_eq!(err.to_string(), "The request could not be completed");
        assert_eq!(
            OrderError::rejected(None).to_string(),
            "The request could not be completed"
        );
    }
}
