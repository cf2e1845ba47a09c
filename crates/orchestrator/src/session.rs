//! Per-user assistant thread sessions.
//!
//! Sessions live in process memory only and are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use assistant_core::{AssistantApi, AssistantError, ThreadHandle};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Maps user ids to their assistant threads.
pub struct SessionManager {
    assistant: Arc<dyn AssistantApi>,
    sessions: RwLock<HashMap<String, ThreadHandle>>,
}

impl SessionManager {
    /// Create an empty session manager backed by the given assistant service.
    pub fn new(assistant: Arc<dyn AssistantApi>) -> Self {
        Self {
            assistant,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the cached thread for a user, if any.
    pub async fn get(&self, user_id: &str) -> Option<ThreadHandle> {
        self.sessions.read().await.get(user_id).cloned()
    }

    /// Get the user's thread, creating one on first contact.
    ///
    /// The thread is created without holding the lock. If two first contacts
    /// for the same user race, the first handle inserted is kept and returned
    /// to both callers; the other thread is abandoned.
    pub async fn get_or_create_thread(&self, user_id: &str) -> Result<ThreadHandle, AssistantError> {
        if let Some(thread) = self.get(user_id).await {
            debug!("Reusing thread {} for {}", thread, user_id);
            return Ok(thread);
        }

        let created = self.assistant.create_thread().await?;

        let mut sessions = self.sessions.write().await;
        let thread = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| created.clone())
            .clone();

        if thread == created {
            info!("Created thread {} for {}", thread, user_id);
        } else {
            debug!(
                "Discarding thread {} for {}: {} was cached first",
                created, user_id, thread
            );
        }

        Ok(thread)
    }

    /// Forget a user's thread. Returns whether a session existed.
    pub async fn reset(&self, user_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(user_id);
        match &removed {
            Some(thread) => info!("Reset session for {} (dropped {})", user_id, thread),
            None => debug!("No session to reset for {}", user_id),
        }
        removed.is_some()
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether there are no active sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_assistant::{DelayedAssistant, FailingAssistant, ScriptedAssistant};

    #[tokio::test]
    async fn test_same_user_gets_same_thread() {
        let api = Arc::new(ScriptedAssistant::new());
        let sessions = SessionManager::new(api.clone());

        let first = sessions.get_or_create_thread("alice").await.unwrap();
        let second = sessions.get_or_create_thread("alice").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.threads_created(), 1);
    }

    #[tokio::test]
    async fn test_users_get_distinct_threads() {
        let sessions = SessionManager::new(Arc::new(ScriptedAssistant::new()));

        let alice = sessions.get_or_create_thread("alice").await.unwrap();
        let bob = sessions.get_or_create_thread("bob").await.unwrap();

        assert_ne!(alice, bob);
        assert_eq!(sessions.len().await, 2);
    }

    #[tokio::test]
    async fn test_reset_then_new_thread() {
        let sessions = SessionManager::new(Arc::new(ScriptedAssistant::new()));

        let before = sessions.get_or_create_thread("alice").await.unwrap();
        assert!(sessions.reset("alice").await);
        assert!(sessions.get("alice").await.is_none());

        let after = sessions.get_or_create_thread("alice").await.unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let sessions = SessionManager::new(Arc::new(ScriptedAssistant::new()));

        assert!(!sessions.reset("nobody").await);
        assert!(!sessions.reset("nobody").await);
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_caches_one_thread() {
        let api = Arc::new(DelayedAssistant::with_millis(ScriptedAssistant::new(), 20));
        let sessions = Arc::new(SessionManager::new(api.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sessions = sessions.clone();
                tokio::spawn(async move { sessions.get_or_create_thread("alice").await })
            })
            .collect();

        let mut threads = Vec::new();
        for handle in handles {
            threads.push(handle.await.unwrap().unwrap());
        }

        assert!(threads.iter().all(|t| *t == threads[0]));
        assert_eq!(sessions.get("alice").await, Some(threads[0].clone()));
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_failure_caches_nothing() {
        let sessions = SessionManager::new(Arc::new(FailingAssistant::default()));

        assert!(sessions.get_or_create_thread("alice").await.is_err());
        assert!(sessions.is_empty().await);
    }
}
