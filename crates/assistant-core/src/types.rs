//! Thread, run and message types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a thread hosted by the assistant service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadHandle(String);

impl ThreadHandle {
    /// Wrap a thread id returned by the service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The service-side thread id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an assistant run.
///
/// Unknown states reported by the service deserialize to [`RunStatus::Unknown`]
/// and are treated as still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the run will not change state any more.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Expired
                | RunStatus::Incomplete
        )
    }

    /// Whether the run ended without producing a reply.
    pub fn is_failure(self) -> bool {
        self.is_terminal() && self != RunStatus::Completed
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single assistant run against a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Service-side run id.
    pub id: String,
    /// Current status.
    pub status: RunStatus,
    /// Error detail reported by the service for failed runs.
    pub last_error: Option<String>,
}

impl Run {
    /// Create a run with the given id and status.
    pub fn new(id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            status,
            last_error: None,
        }
    }
}

/// Author of a thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message stored in a thread, reduced to its text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    /// Service-side message id.
    pub id: String,
    /// Who wrote the message.
    pub role: MessageRole,
    /// Concatenated text parts of the message.
    pub text: String,
}

impl ThreadMessage {
    /// Create a user message.
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::User,
            text: text.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}
