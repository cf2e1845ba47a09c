//! Mock assistant backends for testing the sales assistant pipeline.
//!
//! This crate provides implementations of the `AssistantApi` trait that never
//! leave the process:
//! - `ScriptedAssistant` - In-memory threads with a programmable run lifecycle
//! - `FailingAssistant` - Every call fails as if the service were unreachable
//! - `DelayedAssistant` - Wraps another assistant with artificial latency
//!
//! For production use, see the `openai-assistant` crate.

mod delayed;
mod failing;
mod scripted;

// Re-export assistant-core types for convenience
pub use assistant_core::{
    async_trait, AssistantApi, AssistantError, MessageRole, Run, RunStatus, ThreadHandle,
    ThreadMessage,
};

pub use delayed::DelayedAssistant;
pub use failing::FailingAssistant;
pub use scripted::ScriptedAssistant;
