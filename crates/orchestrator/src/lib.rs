//! Chat pipeline for the sales assistant.
//!
//! This crate provides the [`Orchestrator`] type which turns a user message
//! into an assistant reply and records what happened.
//!
//! # Features
//!
//! - One assistant thread per user, created on first contact
//! - Run polling with a fixed interval and an overall deadline
//! - Canned replies for failed runs, timeouts and unreachable services
//! - Interaction storage with truncation and a context-free retry
//! - Keyword-based sales pattern analysis per exchange
//!
//! # Architecture
//!
//! ```text
//! POST /chat (from api)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Load recent history + last pattern record (store)       │
//! │         ↓                                                   │
//! │  2. Get or create the user's thread (session)               │
//! │         ↓                                                   │
//! │  3. Post message, start run, poll until done (poll)         │
//! │         ↓                                                   │
//! │  4. Store interaction, retry without context (writer)       │
//! │         ↓                                                   │
//! │  5. Analyse patterns and append learning record (patterns)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use database::Database;
//! use orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:mai.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let orchestrator = Orchestrator::from_env(Arc::new(db))?;
//!     let reply = orchestrator.process("alice", "How much does it cost?").await;
//!
//!     println!("Reply: {}", reply.text);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod interaction;
mod orchestrator;
pub mod patterns;
mod poll;
mod session;
mod store;
mod writer;

// Public exports
pub use config::{
    OrchestratorConfig, OrchestratorConfigBuilder, DEFAULT_CONTEXT_LIMIT, DEFAULT_MAX_TEXT_CHARS,
};
pub use error::{OrchestratorError, PersistenceError};
pub use interaction::{Interaction, InteractionContext, PreviousInteraction};
pub use orchestrator::{
    Orchestrator, Reply, ReplyKind, ASSISTANT_ERROR_TEXT, RUN_FAILED_TEXT, TIMEOUT_TEXT,
};
pub use patterns::{analyze, PatternRecord, PatternsIdentified};
pub use poll::{send_message, wait_for_run, PollPolicy, RunOutcome};
pub use session::SessionManager;
pub use store::ConversationStore;
pub use writer::{truncate_chars, InteractionWriter};

// Re-export commonly used types from dependencies
pub use assistant_core::{AssistantApi, AssistantError, ThreadHandle};
pub use database::Database;
