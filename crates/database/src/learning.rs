//! Learning record persistence.
//!
//! Learnings are append-only: every analysed exchange adds a row and nothing
//! is ever updated in place.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{format_timestamp, Learning, LearningDocument, LearningRow};

/// Append a learning record.
pub async fn insert_learning(pool: &SqlitePool, doc: &LearningDocument) -> Result<i64> {
    let patterns = serde_json::to_string(&doc.patterns_identified)?;

    let result = sqlx::query(
        r#"
        INSERT INTO learnings (user_id, timestamp, patterns_identified)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&doc.user_id)
    .bind(format_timestamp(&doc.timestamp))
    .bind(patterns)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get the most recent learning record for a user.
pub async fn latest_learning(pool: &SqlitePool, user_id: &str) -> Result<Option<Learning>> {
    let row = sqlx::query_as::<_, LearningRow>(
        r#"
        SELECT id, user_id, timestamp, patterns_identified
        FROM learnings
        WHERE user_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(Learning::try_from).transpose()
}
