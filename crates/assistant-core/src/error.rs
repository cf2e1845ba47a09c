//! Error types for assistant operations.

use thiserror::Error;

/// Errors that can occur while talking to a hosted assistant.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never reached the service or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The assistant is temporarily unavailable.
    #[error("assistant unavailable: {0}")]
    Unavailable(String),
}

impl AssistantError {
    /// Whether the failure happened before or while reaching the service,
    /// as opposed to the service rejecting the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, AssistantError::Network(_) | AssistantError::Unavailable(_))
    }
}
