//! Core trait and types for hosted assistant backends.
//!
//! This crate provides the shared interface between the sales assistant
//! pipeline and whatever service actually hosts the conversation. It defines:
//!
//! - [`AssistantApi`] - The trait every assistant backend implements
//! - [`ThreadHandle`] / [`Run`] / [`ThreadMessage`] - Thread, run and message types
//! - [`RunStatus`] - Lifecycle states of an asynchronous run
//! - [`AssistantError`] - Error types for assistant operations
//!
//! # Example
//!
//! ```rust
//! use assistant_core::{
//!     async_trait, AssistantApi, AssistantError, Run, RunStatus, ThreadHandle, ThreadMessage,
//! };
//!
//! struct CannedAssistant;
//!
//! #[async_trait]
//! impl AssistantApi for CannedAssistant {
//!     async fn create_thread(&self) -> Result<ThreadHandle, AssistantError> {
//!         Ok(ThreadHandle::new("thread_1"))
//!     }
//!
//!     async fn add_user_message(&self, _: &ThreadHandle, _: &str) -> Result<(), AssistantError> {
//!         Ok(())
//!     }
//!
//!     async fn create_run(&self, _: &ThreadHandle) -> Result<Run, AssistantError> {
//!         Ok(Run::new("run_1", RunStatus::Completed))
//!     }
//!
//!     async fn retrieve_run(&self, _: &ThreadHandle, id: &str) -> Result<Run, AssistantError> {
//!         Ok(Run::new(id, RunStatus::Completed))
//!     }
//!
//!     async fn list_messages(
//!         &self,
//!         _: &ThreadHandle,
//!         _: u32,
//!     ) -> Result<Vec<ThreadMessage>, AssistantError> {
//!         Ok(vec![ThreadMessage::assistant("msg_1", "Hello!")])
//!     }
//!
//!     fn name(&self) -> &str {
//!         "CannedAssistant"
//!     }
//! }
//! ```

mod error;
mod trait_def;
mod types;

pub use error::AssistantError;
pub use trait_def::AssistantApi;
pub use types::{MessageRole, Run, RunStatus, ThreadHandle, ThreadMessage};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
