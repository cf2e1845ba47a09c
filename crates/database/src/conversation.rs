//! Conversation persistence.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{format_timestamp, Conversation, ConversationDocument, ConversationRow};

/// Maximum stored document size, matching the 16 MiB cap common to document stores.
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Insert a conversation document, enforcing [`MAX_DOCUMENT_BYTES`].
pub async fn insert_conversation(pool: &SqlitePool, doc: &ConversationDocument) -> Result<i64> {
    insert_conversation_with_limit(pool, doc, MAX_DOCUMENT_BYTES).await
}

/// Insert a conversation document, rejecting it if it exceeds `max_bytes`.
pub async fn insert_conversation_with_limit(
    pool: &SqlitePool,
    doc: &ConversationDocument,
    max_bytes: usize,
) -> Result<i64> {
    let size = doc.encoded_size()?;
    if size > max_bytes {
        return Err(DatabaseError::DocumentTooLarge {
            size,
            limit: max_bytes,
        });
    }

    let context = doc.context.as_ref().map(serde_json::to_string).transpose()?;
    let success_metrics = doc
        .success_metrics
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let result = sqlx::query(
        r#"
        INSERT INTO conversations (user_id, message, response, timestamp, context, success_metrics)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&doc.user_id)
    .bind(&doc.message)
    .bind(&doc.response)
    .bind(format_timestamp(&doc.timestamp))
    .bind(context)
    .bind(success_metrics)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get the most recent conversations for a user, newest first.
pub async fn recent_conversations(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Conversation>> {
    let rows = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT id, user_id, message, response, timestamp, context, success_metrics
        FROM conversations
        WHERE user_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Conversation::try_from).collect()
}

/// Count stored conversations for a user.
pub async fn count_conversations(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM conversations
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
