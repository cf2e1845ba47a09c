//! Chat interactions and the context carried with them.

use chrono::{DateTime, Utc};
use database::Conversation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::patterns::PatternRecord;

/// A prior exchange included in an interaction's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousInteraction {
    pub message: String,
    pub response: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Conversation> for PreviousInteraction {
    fn from(conversation: Conversation) -> Self {
        Self {
            message: conversation.message,
            response: conversation.response,
            timestamp: conversation.timestamp,
        }
    }
}

/// What was known about the user when a message arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionContext {
    /// Prior exchanges, most recent first.
    #[serde(default)]
    pub previous_interactions: Vec<PreviousInteraction>,
    /// Last pattern analysis recorded for the user; `{}` when there is none.
    #[serde(default, with = "empty_object_as_none")]
    pub learning_patterns: Option<PatternRecord>,
}

impl InteractionContext {
    /// Keep only the `limit` most recent prior interactions.
    pub fn limited(mut self, limit: usize) -> Self {
        self.previous_interactions.truncate(limit);
        self
    }
}

/// Maps a missing pattern record to and from `{}`.
mod empty_object_as_none {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use crate::patterns::PatternRecord;

    pub fn serialize<S: Serializer>(
        record: &Option<PatternRecord>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match record {
            Some(record) => record.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PatternRecord>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            value => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
        }
    }
}

/// One user message and the reply it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub context: InteractionContext,
    pub response: Option<String>,
    pub success_metrics: Option<Value>,
}

impl Interaction {
    /// Start an interaction for a message received now.
    pub fn new(
        user_id: impl Into<String>,
        message: impl Into<String>,
        context: InteractionContext,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            timestamp: Utc::now(),
            context,
            response: None,
            success_metrics: None,
        }
    }

    /// Attach the reply.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Attach outcome metrics.
    pub fn with_success_metrics(mut self, metrics: Value) -> Self {
        self.success_metrics = Some(metrics);
        self
    }
}
