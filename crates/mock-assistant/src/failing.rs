//! Failing assistant - every call to the service fails.

use assistant_core::{
    async_trait, AssistantApi, AssistantError, Run, ThreadHandle, ThreadMessage,
};

/// An assistant whose service is unreachable.
///
/// Useful for checking that callers degrade gracefully instead of surfacing
/// transport failures to the user.
#[derive(Debug, Clone)]
pub struct FailingAssistant {
    reason: String,
}

impl Default for FailingAssistant {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

impl FailingAssistant {
    /// Create an assistant that fails every call with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> AssistantError {
        AssistantError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl AssistantApi for FailingAssistant {
    async fn create_thread(&self) -> Result<ThreadHandle, AssistantError> {
        Err(self.error())
    }

    async fn add_user_message(&self, _: &ThreadHandle, _: &str) -> Result<(), AssistantError> {
        Err(self.error())
    }

    async fn create_run(&self, _: &ThreadHandle) -> Result<Run, AssistantError> {
        Err(self.error())
    }

    async fn retrieve_run(&self, _: &ThreadHandle, _: &str) -> Result<Run, AssistantError> {
        Err(self.error())
    }

    async fn list_messages(
        &self,
        _: &ThreadHandle,
        _: u32,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        Err(self.error())
    }

    fn name(&self) -> &str {
        "FailingAssistant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_fails() {
        let assistant = FailingAssistant::new("offline");
        let thread = ThreadHandle::new("thread_1");

        assert!(assistant.create_thread().await.is_err());
        assert!(assistant.add_user_message(&thread, "hi").await.is_err());
        assert!(assistant.create_run(&thread).await.is_err());
        assert!(assistant.retrieve_run(&thread, "run_1").await.is_err());

        let err = assistant.list_messages(&thread, 1).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "assistant unavailable: offline");
    }
}
