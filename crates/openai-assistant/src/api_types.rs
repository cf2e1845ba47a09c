//! Assistants API request and response types.

use assistant_core::{MessageRole, Run, RunStatus, ThreadMessage};
use serde::{Deserialize, Serialize};

/// A thread object.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    /// Thread ID
    pub id: String,
}

/// Request body for appending a message to a thread.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest<'a> {
    /// Always "user" for messages we send
    pub role: &'static str,
    /// Message text
    pub content: &'a str,
}

/// Request body for starting a run.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest<'a> {
    /// Assistant to run against the thread
    pub assistant_id: &'a str,
}

/// A run object.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    /// Run ID
    pub id: String,
    /// Current status
    pub status: RunStatus,
    /// Error details for failed runs
    #[serde(default)]
    pub last_error: Option<RunLastError>,
}

/// Error attached to a failed run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunLastError {
    /// Error code
    pub code: Option<String>,
    /// Error message
    pub message: String,
}

impl From<RunObject> for Run {
    fn from(run: RunObject) -> Self {
        Run {
            id: run.id,
            status: run.status,
            last_error: run.last_error.map(|e| match e.code {
                Some(code) => format!("{}: {}", code, e.message),
                None => e.message,
            }),
        }
    }
}

/// A page of thread messages.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    /// Messages, in the requested order
    pub data: Vec<MessageObject>,
}

/// A message object.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    /// Message ID
    pub id: String,
    /// Author role
    pub role: MessageRole,
    /// Content parts
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// A single content part of a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Text content
    Text { text: TextContent },
    /// Images, file references and anything else we do not render
    #[serde(other)]
    Other,
}

/// Text payload of a content part.
#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    /// The text itself
    pub value: String,
}

impl From<MessageObject> for ThreadMessage {
    fn from(message: MessageObject) -> Self {
        let text = message
            .content
            .into_iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value),
                MessageContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        ThreadMessage {
            id: message.id,
            role: message.role,
            text,
        }
    }
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Error code
    pub code: Option<String>,
}

impl ApiErrorDetails {
    /// Message prefixed with the code, or the type when there is no code.
    pub fn summary(self) -> String {
        match self.code.or(self.error_type) {
            Some(label) => format!("{}: {}", label, self.message),
            None => self.message,
        }
    }
}
