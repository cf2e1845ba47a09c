//! Storage seam between the pipeline and the database.

use async_trait::async_trait;
use database::{
    conversation, learning, Conversation, ConversationDocument, Database, DatabaseError, Learning,
    LearningDocument,
};

/// Document storage used by the orchestrator.
///
/// Abstracted so the pipeline can be exercised against stores that fail.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a conversation document.
    async fn insert_conversation(&self, doc: &ConversationDocument) -> Result<(), DatabaseError>;

    /// Most recent conversations for a user, newest first.
    async fn recent_conversations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Conversation>, DatabaseError>;

    /// Append a learning record.
    async fn insert_learning(&self, doc: &LearningDocument) -> Result<(), DatabaseError>;

    /// Most recent learning record for a user.
    async fn latest_learning(&self, user_id: &str) -> Result<Option<Learning>, DatabaseError>;
}

#[async_trait]
impl ConversationStore for Database {
    async fn insert_conversation(&self, doc: &ConversationDocument) -> Result<(), DatabaseError> {
        conversation::insert_conversation(self.pool(), doc).await?;
        Ok(())
    }

    async fn recent_conversations(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Conversation>, DatabaseError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        conversation::recent_conversations(self.pool(), user_id, limit).await
    }

    async fn insert_learning(&self, doc: &LearningDocument) -> Result<(), DatabaseError> {
        learning::insert_learning(self.pool(), doc).await?;
        Ok(())
    }

    async fn latest_learning(&self, user_id: &str) -> Result<Option<Learning>, DatabaseError> {
        learning::latest_learning(self.pool(), user_id).await
    }
}
