//! Conversation reset endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Reset confirmation body.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
}

/// Forget the user's assistant thread so the next message starts a new one.
///
/// Stored conversations and learnings are kept.
pub async fn reset(State(state): State<AppState>, body: Bytes) -> Result<Json<ResetResponse>> {
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let user_id = value
        .get("user_id")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("user_id is required".to_string()))?;

    let existed = state.orchestrator.reset(user_id).await;
    info!("Reset conversation for {} (had session: {})", user_id, existed);

    Ok(Json(ResetResponse {
        message: "Conversation reset successfully".to_string(),
    }))
}
