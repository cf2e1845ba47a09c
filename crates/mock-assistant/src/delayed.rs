//! Delayed assistant - wraps another assistant with artificial latency.

use std::time::Duration;

use assistant_core::{
    async_trait, AssistantApi, AssistantError, Run, ThreadHandle, ThreadMessage,
};
use tokio::time::sleep;

/// An assistant that wraps another assistant and delays every call.
///
/// Useful for simulating network latency and for widening race windows in
/// concurrency tests.
pub struct DelayedAssistant<A: AssistantApi> {
    inner: A,
    delay: Duration,
}

impl<A: AssistantApi> DelayedAssistant<A> {
    /// Create a new DelayedAssistant wrapping the given assistant.
    pub fn new(inner: A, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create an assistant with a delay in milliseconds.
    pub fn with_millis(inner: A, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Access the wrapped assistant.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: AssistantApi> AssistantApi for DelayedAssistant<A> {
    async fn create_thread(&self) -> Result<ThreadHandle, AssistantError> {
        sleep(self.delay).await;
        self.inner.create_thread().await
    }

    async fn add_user_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
    ) -> Result<(), AssistantError> {
        sleep(self.delay).await;
        self.inner.add_user_message(thread, text).await
    }

    async fn create_run(&self, thread: &ThreadHandle) -> Result<Run, AssistantError> {
        sleep(self.delay).await;
        self.inner.create_run(thread).await
    }

    async fn retrieve_run(
        &self,
        thread: &ThreadHandle,
        run_id: &str,
    ) -> Result<Run, AssistantError> {
        sleep(self.delay).await;
        self.inner.retrieve_run(thread, run_id).await
    }

    async fn list_messages(
        &self,
        thread: &ThreadHandle,
        limit: u32,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        sleep(self.delay).await;
        self.inner.list_messages(thread, limit).await
    }

    fn name(&self) -> &str {
        "DelayedAssistant"
    }
}
