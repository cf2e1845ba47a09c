//! Persistence of interactions and pattern records.

use std::sync::Arc;

use database::{ConversationDocument, LearningDocument};
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::interaction::Interaction;
use crate::patterns::PatternRecord;
use crate::store::ConversationStore;

/// Truncate text to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Writes interactions and learning records to a [`ConversationStore`].
pub struct InteractionWriter {
    store: Arc<dyn ConversationStore>,
    max_text_chars: usize,
    context_limit: usize,
}

impl InteractionWriter {
    /// Create a writer with the given truncation length and context limit.
    pub fn new(store: Arc<dyn ConversationStore>, max_text_chars: usize, context_limit: usize) -> Self {
        Self {
            store,
            max_text_chars,
            context_limit,
        }
    }

    /// Build the stored form of an interaction.
    ///
    /// Message and response are truncated and the context keeps only the most
    /// recent prior interactions.
    pub fn document_for(&self, interaction: &Interaction) -> Result<ConversationDocument, PersistenceError> {
        let context = interaction.context.clone().limited(self.context_limit);

        Ok(ConversationDocument {
            user_id: interaction.user_id.clone(),
            message: truncate_chars(&interaction.message, self.max_text_chars),
            response: interaction
                .response
                .as_deref()
                .map(|r| truncate_chars(r, self.max_text_chars)),
            timestamp: interaction.timestamp,
            context: Some(serde_json::to_value(&context)?),
            success_metrics: interaction.success_metrics.clone(),
        })
    }

    /// Store an interaction, retrying once without its context on failure.
    pub async fn store(&self, interaction: &Interaction) -> Result<(), PersistenceError> {
        let mut doc = self.document_for(interaction)?;

        let first = match self.store.insert_conversation(&doc).await {
            Ok(()) => {
                debug!("Stored interaction for {}", interaction.user_id);
                return Ok(());
            }
            Err(e) => e,
        };

        warn!(
            "Storing interaction for {} failed ({}), retrying without context",
            interaction.user_id, first
        );
        doc.context = None;

        match self.store.insert_conversation(&doc).await {
            Ok(()) => {
                debug!("Stored interaction for {} without context", interaction.user_id);
                Ok(())
            }
            Err(retry) => Err(PersistenceError::RetryFailed { first, retry }),
        }
    }

    /// Append a pattern record to the learnings collection.
    pub async fn record_patterns(&self, record: &PatternRecord) -> Result<(), PersistenceError> {
        let doc = LearningDocument {
            user_id: record.user_id.clone(),
            timestamp: record.timestamp,
            patterns_identified: serde_json::to_value(&record.patterns_identified)?,
        };

        self.store.insert_learning(&doc).await?;
        debug!("Recorded patterns for {}", record.user_id);
        Ok(())
    }
}
