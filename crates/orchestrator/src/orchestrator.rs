//! Main orchestrator that runs the chat pipeline.

use std::sync::Arc;
use std::time::Instant;

use assistant_core::{AssistantApi, AssistantError, ThreadHandle};
use openai_assistant::OpenAiAssistant;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::interaction::{Interaction, InteractionContext, PreviousInteraction};
use crate::patterns::{PatternRecord, PatternsIdentified};
use crate::poll::{send_message, RunOutcome};
use crate::session::SessionManager;
use crate::store::ConversationStore;
use crate::writer::InteractionWriter;

/// Reply when a run ends in a failure status.
pub const RUN_FAILED_TEXT: &str =
    "I apologize, but I encountered an error processing your request.";

/// Reply when the assistant service cannot be reached or misbehaves.
pub const ASSISTANT_ERROR_TEXT: &str =
    "I apologize, but I encountered an error processing your message.";

/// Reply when a run does not finish in time.
pub const TIMEOUT_TEXT: &str =
    "I'm sorry, this is taking longer than expected. Please try again in a moment.";

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// The assistant answered.
    Answered,
    /// First contact greeting; no run was started.
    Greeting,
    /// The run ended in a failure status.
    RunFailed,
    /// The run did not finish in time.
    TimedOut,
    /// The assistant service failed.
    AssistantUnavailable,
}

/// Text returned to the user plus how it came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
}

impl Reply {
    fn new(text: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

impl From<RunOutcome> for Reply {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed(text) => Reply::new(text, ReplyKind::Answered),
            RunOutcome::Failed { .. } => Reply::new(RUN_FAILED_TEXT, ReplyKind::RunFailed),
            RunOutcome::TimedOut { .. } => Reply::new(TIMEOUT_TEXT, ReplyKind::TimedOut),
        }
    }
}

/// Coordinates sessions, the assistant service and persistence.
///
/// For each message the orchestrator:
/// - Loads the user's recent history and last pattern record
/// - Gets or creates the user's assistant thread
/// - Posts the message, runs the assistant and waits for the reply
/// - Stores the exchange and its pattern analysis
///
/// Assistant failures become canned replies; storage failures are logged and
/// never affect the reply.
pub struct Orchestrator {
    assistant: Arc<dyn AssistantApi>,
    sessions: SessionManager,
    store: Arc<dyn ConversationStore>,
    writer: InteractionWriter,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        assistant: Arc<dyn AssistantApi>,
        store: Arc<dyn ConversationStore>,
        config: OrchestratorConfig,
    ) -> Self {
        let writer = InteractionWriter::new(
            store.clone(),
            config.max_text_chars,
            config.context_limit,
        );

        Self {
            sessions: SessionManager::new(assistant.clone()),
            assistant,
            store,
            writer,
            config,
        }
    }

    /// Create an orchestrator backed by the OpenAI Assistants API.
    ///
    /// Fails if `OPENAI_API_KEY` or `ASSISTANT_ID` is missing.
    pub fn from_env(store: Arc<dyn ConversationStore>) -> Result<Self, OrchestratorError> {
        let assistant = OpenAiAssistant::from_env()?;
        let config = OrchestratorConfig::from_env();

        info!(
            "Using assistant {} (poll every {:?}, timeout {:?})",
            assistant.config().assistant_id,
            config.poll.interval,
            config.poll.timeout
        );

        Ok(Self::new(Arc::new(assistant), store, config))
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Process one user message and produce a reply.
    ///
    /// Always returns a reply: assistant failures degrade to canned text.
    pub async fn process(&self, user_id: &str, message: &str) -> Reply {
        let started = Instant::now();
        let context = self.load_context(user_id).await;
        let interaction = Interaction::new(user_id, message, context);

        let reply = match self.generate_reply(user_id, message).await {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_transport() {
                    warn!(
                        "Assistant {} unreachable for {}: {}",
                        self.assistant.name(),
                        user_id,
                        e
                    );
                } else {
                    error!(
                        "Assistant {} failed for {}: {}",
                        self.assistant.name(),
                        user_id,
                        e
                    );
                }
                // Nothing is stored when the service itself failed
                return Reply::new(ASSISTANT_ERROR_TEXT, ReplyKind::AssistantUnavailable);
            }
        };

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Replied to {} ({:?}, {} ms)",
            user_id, reply.kind, latency_ms
        );

        let interaction = interaction
            .with_response(reply.text.clone())
            .with_success_metrics(json!({
                "outcome": reply.kind,
                "latency_ms": latency_ms,
            }));
        self.persist(&interaction).await;

        reply
    }

    /// Forget the user's assistant thread. Returns whether one existed.
    pub async fn reset(&self, user_id: &str) -> bool {
        self.sessions.reset(user_id).await
    }

    async fn generate_reply(&self, user_id: &str, message: &str) -> Result<Reply, AssistantError> {
        let thread = self.sessions.get_or_create_thread(user_id).await?;

        if let Some(greeting) = &self.config.first_contact_greeting {
            if self.is_new_thread(&thread).await? {
                self.assistant.add_user_message(&thread, message).await?;
                debug!("Greeting {} on new thread {}", user_id, thread);
                return Ok(Reply::new(greeting.clone(), ReplyKind::Greeting));
            }
        }

        let outcome = send_message(self.assistant.as_ref(), &thread, message, &self.config.poll).await?;
        Ok(Reply::from(outcome))
    }

    async fn is_new_thread(&self, thread: &ThreadHandle) -> Result<bool, AssistantError> {
        Ok(self.assistant.list_messages(thread, 1).await?.is_empty())
    }

    /// Recent history and last pattern record for a user.
    ///
    /// Lookup failures yield an empty context.
    async fn load_context(&self, user_id: &str) -> InteractionContext {
        let previous_interactions = match self
            .store
            .recent_conversations(user_id, self.config.context_limit)
            .await
        {
            Ok(conversations) => conversations
                .into_iter()
                .map(PreviousInteraction::from)
                .collect(),
            Err(e) => {
                warn!("Failed to load history for {}: {}", user_id, e);
                Vec::new()
            }
        };

        let learning_patterns = match self.store.latest_learning(user_id).await {
            Ok(Some(learning)) => Some(PatternRecord {
                timestamp: learning.timestamp,
                user_id: learning.user_id,
                patterns_identified: serde_json::from_value::<PatternsIdentified>(
                    learning.patterns_identified,
                )
                .unwrap_or_else(|e| {
                    warn!("Ignoring unreadable pattern record for {}: {}", user_id, e);
                    PatternsIdentified::default()
                }),
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load patterns for {}: {}", user_id, e);
                None
            }
        };

        InteractionContext {
            previous_interactions,
            learning_patterns,
        }
    }

    /// Store the exchange and its analysis; failures are logged and dropped.
    async fn persist(&self, interaction: &Interaction) {
        if let Err(e) = self.writer.store(interaction).await {
            error!("Dropping interaction for {}: {}", interaction.user_id, e);
        }

        let record = PatternRecord::from_interaction(interaction);
        if let Err(e) = self.writer.record_patterns(&record).await {
            error!("Dropping pattern record for {}: {}", interaction.user_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::RunStatus;
    use async_trait::async_trait;
    use database::{
        conversation, learning, Conversation, ConversationDocument, Database, DatabaseError,
        Learning, LearningDocument,
    };
    use mock_assistant::{FailingAssistant, ScriptedAssistant};
    use std::time::Duration;

    use crate::patterns::TopicCategory;

    /// Store whose every read and write fails.
    struct BrokenStore;

    impl BrokenStore {
        fn failure() -> DatabaseError {
            DatabaseError::DocumentTooLarge { size: 2, limit: 1 }
        }
    }

    #[async_trait]
    impl ConversationStore for BrokenStore {
        async fn insert_conversation(&self, _doc: &ConversationDocument) -> Result<(), DatabaseError> {
            Err(Self::failure())
        }

        async fn recent_conversations(
            &self,
            _user_id: &str,
            _limit: usize,
        ) -> Result<Vec<Conversation>, DatabaseError> {
            Err(Self::failure())
        }

        async fn insert_learning(&self, _doc: &LearningDocument) -> Result<(), DatabaseError> {
            Err(Self::failure())
        }

        async fn latest_learning(&self, _user_id: &str) -> Result<Option<Learning>, DatabaseError> {
            Err(Self::failure())
        }
    }

    async fn memory_db() -> Arc<Database> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        Arc::new(db)
    }

    fn fast_config() -> OrchestratorConfig {
        OrchestratorConfig::builder()
            .poll_interval(Duration::from_millis(5))
            .run_timeout(Duration::from_millis(200))
            .build()
    }

    #[tokio::test]
    async fn test_process_answers_and_persists() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::new());
        let orchestrator = Orchestrator::new(api.clone(), db.clone(), fast_config());

        let reply = orchestrator
            .process("alice", "What's the price of the premium plan?")
            .await;

        assert_eq!(reply.kind, ReplyKind::Answered);
        assert_eq!(reply.text, "Echo: What's the price of the premium plan?");

        let stored = conversation::recent_conversations(db.pool(), "alice", 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].response.as_deref(), Some(reply.text.as_str()));
        assert_eq!(
            stored[0].success_metrics.as_ref().unwrap()["outcome"],
            "answered"
        );

        let learning = learning::latest_learning(db.pool(), "alice")
            .await
            .unwrap()
            .unwrap();
        let patterns: PatternsIdentified =
            serde_json::from_value(learning.patterns_identified).unwrap();
        assert_eq!(patterns.interaction_type.topic_category, TopicCategory::Pricing);
        assert!(patterns.interaction_type.question_asked);
    }

    #[tokio::test]
    async fn test_thread_reused_across_messages() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::new());
        let orchestrator = Orchestrator::new(api.clone(), db, fast_config());

        orchestrator.process("alice", "one").await;
        orchestrator.process("alice", "two").await;

        assert_eq!(api.threads_created(), 1);
        assert_eq!(api.runs_created(), 2);
        let thread = orchestrator.sessions().get("alice").await.unwrap();
        assert_eq!(api.messages(&thread).await.len(), 4);
    }

    #[tokio::test]
    async fn test_reset_starts_new_thread() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::new());
        let orchestrator = Orchestrator::new(api.clone(), db, fast_config());

        orchestrator.process("alice", "one").await;
        let before = orchestrator.sessions().get("alice").await.unwrap();

        assert!(orchestrator.reset("alice").await);
        assert!(!orchestrator.reset("alice").await);

        orchestrator.process("alice", "two").await;
        let after = orchestrator.sessions().get("alice").await.unwrap();
        assert_ne!(before, after);
        assert_eq!(api.threads_created(), 2);
    }

    #[tokio::test]
    async fn test_context_never_exceeds_limit() {
        let db = memory_db().await;
        let orchestrator =
            Orchestrator::new(Arc::new(ScriptedAssistant::new()), db.clone(), fast_config());

        for i in 0..11 {
            orchestrator.process("alice", &format!("message {}", i)).await;
        }

        let stored = conversation::recent_conversations(db.pool(), "alice", 20)
            .await
            .unwrap();
        assert_eq!(stored.len(), 11);
        for conversation in &stored {
            let context = conversation.context.as_ref().unwrap();
            let previous = context["previous_interactions"].as_array().unwrap();
            assert!(previous.len() <= 3);
        }

        // The newest context holds the three messages before it, newest first
        let latest = stored[0].context.as_ref().unwrap();
        let previous: Vec<_> = latest["previous_interactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(previous, vec!["message 9", "message 8", "message 7"]);
        assert!(latest["learning_patterns"].is_object());
    }

    #[tokio::test]
    async fn test_context_is_scoped_by_user() {
        let db = memory_db().await;
        let orchestrator =
            Orchestrator::new(Arc::new(ScriptedAssistant::new()), db.clone(), fast_config());

        orchestrator.process("alice", "secret plans").await;
        orchestrator.process("bob", "hello").await;

        let bob = conversation::recent_conversations(db.pool(), "bob", 1)
            .await
            .unwrap();
        let context = bob[0].context.as_ref().unwrap();
        assert_eq!(context["previous_interactions"], json!([]));
        assert_eq!(context["learning_patterns"], json!({}));
    }

    #[tokio::test]
    async fn test_broken_store_does_not_change_reply() {
        let api = Arc::new(ScriptedAssistant::new());
        let orchestrator = Orchestrator::new(api.clone(), Arc::new(BrokenStore), fast_config());

        let first = orchestrator.process("alice", "hi").await;
        let second = orchestrator.process("alice", "still there?").await;

        assert_eq!(first, Reply::new("Echo: hi", ReplyKind::Answered));
        assert_eq!(second, Reply::new("Echo: still there?", ReplyKind::Answered));
        assert_eq!(api.threads_created(), 1);
    }

    #[tokio::test]
    async fn test_silent_run_never_repeats_previous_answer() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::new().with_silent_runs_after(1));
        let orchestrator = Orchestrator::new(api, db.clone(), fast_config());

        let first = orchestrator.process("alice", "first question").await;
        let second = orchestrator.process("alice", "second question").await;

        assert_eq!(first.text, "Echo: first question");
        assert_eq!(second, Reply::new(ASSISTANT_ERROR_TEXT, ReplyKind::AssistantUnavailable));
        assert_eq!(
            conversation::count_conversations(db.pool(), "alice").await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_failed_run_returns_apology() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::ending_with(RunStatus::Failed));
        let orchestrator = Orchestrator::new(api, db.clone(), fast_config());

        let reply = orchestrator.process("alice", "hello").await;

        assert_eq!(reply, Reply::new(RUN_FAILED_TEXT, ReplyKind::RunFailed));
        assert_eq!(
            conversation::count_conversations(db.pool(), "alice").await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_timeout_returns_delay_text() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::never_completes());
        let config = OrchestratorConfig::builder()
            .poll_interval(Duration::from_millis(5))
            .run_timeout(Duration::from_millis(30))
            .build();
        let orchestrator = Orchestrator::new(api, db, config);

        let reply = orchestrator.process("alice", "hello").await;

        assert_eq!(reply.kind, ReplyKind::TimedOut);
        assert_eq!(reply.text, TIMEOUT_TEXT);
    }

    #[tokio::test]
    async fn test_unavailable_assistant_degrades_without_storing() {
        let db = memory_db().await;
        let orchestrator =
            Orchestrator::new(Arc::new(FailingAssistant::default()), db.clone(), fast_config());

        let reply = orchestrator.process("alice", "hello").await;

        assert_eq!(reply.kind, ReplyKind::AssistantUnavailable);
        assert_eq!(reply.text, ASSISTANT_ERROR_TEXT);
        assert_eq!(
            conversation::count_conversations(db.pool(), "alice").await.unwrap(),
            0
        );
        assert!(orchestrator.sessions().is_empty().await);
    }

    #[tokio::test]
    async fn test_first_contact_greeting() {
        let db = memory_db().await;
        let api = Arc::new(ScriptedAssistant::new());
        let config = OrchestratorConfig::builder()
            .poll_interval(Duration::from_millis(5))
            .first_contact_greeting("Welcome! How can I help?")
            .build();
        let orchestrator = Orchestrator::new(api.clone(), db, config);

        let first = orchestrator.process("alice", "hi").await;
        assert_eq!(first, Reply::new("Welcome! How can I help?", ReplyKind::Greeting));
        assert_eq!(api.runs_created(), 0);

        let thread = orchestrator.sessions().get("alice").await.unwrap();
        assert_eq!(api.messages(&thread).await.len(), 1);

        let second = orchestrator.process("alice", "tell me about pricing").await;
        assert_eq!(second.kind, ReplyKind::Answered);
        assert_eq!(api.runs_created(), 1);
    }

    #[tokio::test]
    async fn test_long_text_is_truncated_in_storage() {
        let db = memory_db().await;
        let config = OrchestratorConfig::builder()
            .poll_interval(Duration::from_millis(5))
            .max_text_chars(10)
            .build();
        let orchestrator = Orchestrator::new(
            Arc::new(ScriptedAssistant::new().with_reply("a".repeat(50))),
            db.clone(),
            config,
        );

        let reply = orchestrator.process("alice", &"b".repeat(50)).await;
        assert_eq!(reply.text.len(), 50);

        let stored = conversation::recent_conversations(db.pool(), "alice", 1)
            .await
            .unwrap();
        assert_eq!(stored[0].message, "b".repeat(10));
        assert_eq!(stored[0].response.as_deref(), Some("a".repeat(10).as_str()));
    }
}
