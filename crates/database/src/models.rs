//! Database models.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::{DatabaseError, Result};

/// A conversation document ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDocument {
    /// User the exchange belongs to.
    pub user_id: String,
    /// User message (already truncated by the caller).
    pub message: String,
    /// Assistant reply, if one was produced.
    pub response: Option<String>,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
    /// Embedded context snapshot.
    pub context: Option<Value>,
    /// Optional outcome metrics.
    pub success_metrics: Option<Value>,
}

impl ConversationDocument {
    /// Approximate stored size in bytes: text fields plus encoded JSON.
    pub fn encoded_size(&self) -> Result<usize> {
        let mut size = self.user_id.len() + self.message.len();
        size += self.response.as_ref().map_or(0, String::len);
        if let Some(context) = &self.context {
            size += serde_json::to_vec(context)?.len();
        }
        if let Some(metrics) = &self.success_metrics {
            size += serde_json::to_vec(metrics)?.len();
        }
        Ok(size)
    }
}

/// A stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Auto-incrementing ID.
    pub id: i64,
    /// User the exchange belongs to.
    pub user_id: String,
    /// User message.
    pub message: String,
    /// Assistant reply, if any.
    pub response: Option<String>,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
    /// Embedded context snapshot, absent if it was dropped to fit.
    pub context: Option<Value>,
    /// Optional outcome metrics.
    pub success_metrics: Option<Value>,
}

/// A learning (pattern analysis) document ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningDocument {
    /// User the analysis belongs to.
    pub user_id: String,
    /// When the analysed exchange happened.
    pub timestamp: DateTime<Utc>,
    /// Analysis result.
    pub patterns_identified: Value,
}

/// A stored learning record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    /// Auto-incrementing ID.
    pub id: i64,
    /// User the analysis belongs to.
    pub user_id: String,
    /// When the analysed exchange happened.
    pub timestamp: DateTime<Utc>,
    /// Analysis result.
    pub patterns_identified: Value,
}

#[derive(Debug, FromRow)]
pub(crate) struct ConversationRow {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub response: Option<String>,
    pub timestamp: String,
    pub context: Option<String>,
    pub success_metrics: Option<String>,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = DatabaseError;

    fn try_from(row: ConversationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            message: row.message,
            response: row.response,
            timestamp: parse_timestamp(&row.timestamp)?,
            context: row.context.as_deref().map(serde_json::from_str).transpose()?,
            success_metrics: row
                .success_metrics
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct LearningRow {
    pub id: i64,
    pub user_id: String,
    pub timestamp: String,
    pub patterns_identified: String,
}

impl TryFrom<LearningRow> for Learning {
    type Error = DatabaseError;

    fn try_from(row: LearningRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            timestamp: parse_timestamp(&row.timestamp)?,
            patterns_identified: serde_json::from_str(&row.patterns_identified)?,
        })
    }
}

/// Format a timestamp for storage.
///
/// Fixed microsecond precision in UTC keeps lexical order equal to
/// chronological order, which the `ORDER BY timestamp` queries rely on.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidTimestamp(format!("{}: {}", value, e)))
}
