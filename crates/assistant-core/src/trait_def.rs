//! The AssistantApi trait definition.

use async_trait::async_trait;

use crate::error::AssistantError;
use crate::types::{Run, ThreadHandle, ThreadMessage};

/// Operations offered by a hosted assistant that keeps conversation threads.
///
/// The model is asynchronous from the caller's point of view: a user message
/// is appended to a thread, a run is started, and the caller polls the run
/// until it reaches a terminal [`RunStatus`](crate::RunStatus).
///
/// This trait is object-safe and can be used with `Arc<dyn AssistantApi>`.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create a new, empty conversation thread.
    async fn create_thread(&self) -> Result<ThreadHandle, AssistantError>;

    /// Append a user message to a thread.
    async fn add_user_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
    ) -> Result<(), AssistantError>;

    /// Start an assistant run against a thread.
    async fn create_run(&self, thread: &ThreadHandle) -> Result<Run, AssistantError>;

    /// Fetch the current state of a run.
    async fn retrieve_run(
        &self,
        thread: &ThreadHandle,
        run_id: &str,
    ) -> Result<Run, AssistantError>;

    /// List up to `limit` messages of a thread, most recent first.
    async fn list_messages(
        &self,
        thread: &ThreadHandle,
        limit: u32,
    ) -> Result<Vec<ThreadMessage>, AssistantError>;

    /// Get a human-readable name for this backend.
    fn name(&self) -> &str;
}
