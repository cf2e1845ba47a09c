//! Error types for orchestrator operations.

use assistant_core::AssistantError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while setting up or running the chat pipeline.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The assistant service could not be configured or reached.
    #[error("assistant error: {0}")]
    Assistant(#[from] AssistantError),
}

/// Errors raised by the persistence writer.
///
/// These never reach the HTTP caller: the orchestrator logs and drops them.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The interaction could not be encoded.
    #[error("failed to encode interaction: {0}")]
    Encode(#[from] serde_json::Error),

    /// The store rejected the write.
    #[error("store error: {0}")]
    Store(#[from] DatabaseError),

    /// The store rejected both the full document and the context-free retry.
    #[error("store rejected interaction ({first}); retry without context also failed ({retry})")]
    RetryFailed {
        first: DatabaseError,
        retry: DatabaseError,
    },
}
