//! OpenAI Assistants API backend.
//!
//! This crate provides an [`AssistantApi`] implementation that talks to the
//! hosted Assistants API: threads hold the conversation, runs produce replies
//! asynchronously and are polled by the caller.
//!
//! # Features
//!
//! - Thread creation, message posting, run creation and run polling
//! - Text extraction from multi-part thread messages
//! - API error bodies surfaced as [`AssistantError::Api`]
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_assistant::{AssistantApi, OpenAiAssistant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let assistant = OpenAiAssistant::from_env()?;
//!     let thread = assistant.create_thread().await?;
//!     assistant.add_user_message(&thread, "Hello!").await?;
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::OpenAiAssistant;
pub use config::{AssistantConfig, AssistantConfigBuilder, DEFAULT_API_URL};

// Re-export assistant-core types for convenience
pub use assistant_core::{
    async_trait, AssistantApi, AssistantError, MessageRole, Run, RunStatus, ThreadHandle,
    ThreadMessage,
};
