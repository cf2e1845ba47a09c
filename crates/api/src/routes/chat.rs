//! Chat endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// User id applied when a request does not name one.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Chat reply body.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// A validated chat request.
#[derive(Debug, PartialEq, Eq)]
struct ChatRequest {
    user_id: String,
    message: String,
}

impl ChatRequest {
    /// Parse a raw body. Anything that is not a JSON object with a non-empty
    /// string `message` is rejected.
    fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ApiError::Validation("Message is required".to_string()))?;

        let user_id = value
            .get("user_id")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_USER_ID);

        Ok(Self {
            user_id: user_id.to_string(),
            message: message.to_string(),
        })
    }
}

/// Send a message to the assistant and return its reply.
///
/// The pipeline runs on its own task so a client that disconnects does not
/// cancel the run polling or the persistence that follows.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>> {
    let ChatRequest { user_id, message } = ChatRequest::parse(&body)?;
    info!("Chat message from {} ({} chars)", user_id, message.chars().count());

    let orchestrator = state.orchestrator.clone();
    let reply = tokio::spawn(async move { orchestrator.process(&user_id, &message).await })
        .await
        .map_err(|e| ApiError::Unexpected(format!("chat task failed: {}", e)))?;

    Ok(Json(ChatResponse {
        response: reply.text,
    }))
}
