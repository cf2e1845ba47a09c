//! Scripted assistant - an in-memory thread service with a programmable run lifecycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use assistant_core::{
    async_trait, AssistantApi, AssistantError, MessageRole, Run, RunStatus, ThreadHandle,
    ThreadMessage,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// How the assistant phrases its replies.
#[derive(Debug, Clone)]
enum ReplyMode {
    /// Echo the latest user message with a prefix.
    Echo(String),
    /// Always answer with the same text.
    Fixed(String),
}

#[derive(Debug)]
struct RunState {
    thread_id: String,
    polls: usize,
    replied: bool,
    silent: bool,
}

/// An assistant that keeps threads in memory and walks every run through a
/// fixed sequence of statuses.
///
/// Each call to `retrieve_run` advances the run one step through the script;
/// the last status repeats forever. When a run is first observed as
/// `completed`, the reply is appended to the thread.
///
/// # Example
///
/// ```rust
/// use mock_assistant::{AssistantApi, RunStatus, ScriptedAssistant};
///
/// #[tokio::main]
/// async fn main() -> Result<(), mock_assistant::AssistantError> {
///     let assistant = ScriptedAssistant::new()
///         .with_statuses(vec![RunStatus::InProgress, RunStatus::Completed]);
///
///     let thread = assistant.create_thread().await?;
///     assistant.add_user_message(&thread, "Hello!").await?;
///     let run = assistant.create_run(&thread).await?;
///
///     assert_eq!(assistant.retrieve_run(&thread, &run.id).await?.status, RunStatus::InProgress);
///     assert_eq!(assistant.retrieve_run(&thread, &run.id).await?.status, RunStatus::Completed);
///
///     let latest = assistant.list_messages(&thread, 1).await?;
///     assert_eq!(latest[0].text, "Echo: Hello!");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ScriptedAssistant {
    statuses: Vec<RunStatus>,
    reply: ReplyMode,
    replying_runs: Option<usize>,
    threads: Mutex<HashMap<String, Vec<ThreadMessage>>>,
    runs: Mutex<HashMap<String, RunState>>,
    threads_created: AtomicUsize,
    runs_created: AtomicUsize,
    polls: AtomicUsize,
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedAssistant {
    /// Create an assistant whose runs complete on the first poll and echo the
    /// user's message back.
    pub fn new() -> Self {
        Self {
            statuses: vec![RunStatus::Completed],
            reply: ReplyMode::Echo("Echo: ".to_string()),
            replying_runs: None,
            threads: Mutex::new(HashMap::new()),
            runs: Mutex::new(HashMap::new()),
            threads_created: AtomicUsize::new(0),
            runs_created: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
        }
    }

    /// Create an assistant whose runs stay `in_progress` forever.
    pub fn never_completes() -> Self {
        Self::new().with_statuses(vec![RunStatus::InProgress])
    }

    /// Create an assistant whose runs end with the given terminal status.
    pub fn ending_with(status: RunStatus) -> Self {
        Self::new().with_statuses(vec![RunStatus::Queued, status])
    }

    /// Set the sequence of statuses each run goes through.
    ///
    /// An empty script is treated as immediately completed.
    pub fn with_statuses(mut self, statuses: Vec<RunStatus>) -> Self {
        self.statuses = if statuses.is_empty() {
            vec![RunStatus::Completed]
        } else {
            statuses
        };
        self
    }

    /// Always answer with the given text.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = ReplyMode::Fixed(reply.into());
        self
    }

    /// Only the first `runs` runs write a reply; later runs still complete
    /// but leave the thread untouched.
    pub fn with_silent_runs_after(mut self, runs: usize) -> Self {
        self.replying_runs = Some(runs);
        self
    }

    /// Number of threads created so far.
    pub fn threads_created(&self) -> usize {
        self.threads_created.load(Ordering::SeqCst)
    }

    /// Number of runs started so far.
    pub fn runs_created(&self) -> usize {
        self.runs_created.load(Ordering::SeqCst)
    }

    /// Number of `retrieve_run` calls so far.
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    /// All messages of a thread in chronological order.
    pub async fn messages(&self, thread: &ThreadHandle) -> Vec<ThreadMessage> {
        self.threads
            .lock()
            .await
            .get(thread.id())
            .cloned()
            .unwrap_or_default()
    }

    fn status_at(&self, step: usize) -> RunStatus {
        let last = self.statuses.len() - 1;
        self.statuses[step.min(last)]
    }

    fn reply_for(&self, history: &[ThreadMessage]) -> String {
        match &self.reply {
            ReplyMode::Fixed(text) => text.clone(),
            ReplyMode::Echo(prefix) => {
                let last_user = history
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::User)
                    .map(|m| m.text.as_str())
                    .unwrap_or_default();
                format!("{}{}", prefix, last_user)
            }
        }
    }

    fn unknown_thread(thread: &ThreadHandle) -> AssistantError {
        AssistantError::Api {
            status: 404,
            message: format!("No thread found with id '{}'.", thread),
        }
    }
}

#[async_trait]
impl AssistantApi for ScriptedAssistant {
    async fn create_thread(&self) -> Result<ThreadHandle, AssistantError> {
        let id = format!("thread_{}", Uuid::new_v4().simple());
        self.threads.lock().await.insert(id.clone(), Vec::new());
        self.threads_created.fetch_add(1, Ordering::SeqCst);
        Ok(ThreadHandle::new(id))
    }

    async fn add_user_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
    ) -> Result<(), AssistantError> {
        let mut threads = self.threads.lock().await;
        let messages = threads
            .get_mut(thread.id())
            .ok_or_else(|| Self::unknown_thread(thread))?;

        let id = format!("msg_{}", Uuid::new_v4().simple());
        messages.push(ThreadMessage::user(id, text));
        Ok(())
    }

    async fn create_run(&self, thread: &ThreadHandle) -> Result<Run, AssistantError> {
        if !self.threads.lock().await.contains_key(thread.id()) {
            return Err(Self::unknown_thread(thread));
        }

        let id = format!("run_{}", Uuid::new_v4().simple());
        let index = self.runs_created.fetch_add(1, Ordering::SeqCst);
        self.runs.lock().await.insert(
            id.clone(),
            RunState {
                thread_id: thread.id().to_string(),
                polls: 0,
                replied: false,
                silent: self.replying_runs.is_some_and(|n| index >= n),
            },
        );
        Ok(Run::new(id, RunStatus::Queued))
    }

    async fn retrieve_run(
        &self,
        thread: &ThreadHandle,
        run_id: &str,
    ) -> Result<Run, AssistantError> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let mut runs = self.runs.lock().await;
        let state = runs
            .get_mut(run_id)
            .filter(|state| state.thread_id == thread.id())
            .ok_or_else(|| AssistantError::Api {
                status: 404,
                message: format!("No run found with id '{}'.", run_id),
            })?;

        let status = self.status_at(state.polls);
        state.polls += 1;

        if status == RunStatus::Completed && !state.replied && !state.silent {
            state.replied = true;
            let mut threads = self.threads.lock().await;
            let messages = threads
                .get_mut(thread.id())
                .ok_or_else(|| Self::unknown_thread(thread))?;
            let reply = self.reply_for(messages);
            let id = format!("msg_{}", Uuid::new_v4().simple());
            messages.push(ThreadMessage::assistant(id, reply));
        }

        let mut run = Run::new(run_id, status);
        if status.is_failure() {
            run.last_error = Some(format!("scripted {}", status));
        }
        Ok(run)
    }

    async fn list_messages(
        &self,
        thread: &ThreadHandle,
        limit: u32,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        let threads = self.threads.lock().await;
        let messages = threads
            .get(thread.id())
            .ok_or_else(|| Self::unknown_thread(thread))?;

        Ok(messages
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "ScriptedAssistant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_threads_are_distinct() {
        let assistant = ScriptedAssistant::new();

        let a = assistant.create_thread().await.unwrap();
        let b = assistant.create_thread().await.unwrap();

        assert_ne!(a, b);
        assert_eq!(assistant.threads_created(), 2);
    }

    #[tokio::test]
    async fn test_run_follows_script_and_last_status_repeats() {
        let assistant = ScriptedAssistant::new().with_statuses(vec![
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::Completed,
        ]);
        let thread = assistant.create_thread().await.unwrap();
        assistant.add_user_message(&thread, "hi").await.unwrap();
        let run = assistant.create_run(&thread).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(assistant.retrieve_run(&thread, &run.id).await.unwrap().status);
        }

        assert_eq!(
            seen,
            vec![
                RunStatus::Queued,
                RunStatus::InProgress,
                RunStatus::Completed,
                RunStatus::Completed
            ]
        );
        assert_eq!(assistant.polls(), 4);
        // Reply appended exactly once
        assert_eq!(assistant.messages(&thread).await.len(), 2);
    }

    #[tokio::test]
    async fn test_fixed_reply() {
        let assistant = ScriptedAssistant::new().with_reply("Our premium plan is $49/month.");
        let thread = assistant.create_thread().await.unwrap();
        assistant.add_user_message(&thread, "price?").await.unwrap();
        let run = assistant.create_run(&thread).await.unwrap();
        assistant.retrieve_run(&thread, &run.id).await.unwrap();

        let latest = assistant.list_messages(&thread, 1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].role, MessageRole::Assistant);
        assert_eq!(latest[0].text, "Our premium plan is $49/month.");
    }

    #[tokio::test]
    async fn test_failed_run_has_error_and_no_reply() {
        let assistant = ScriptedAssistant::ending_with(RunStatus::Failed);
        let thread = assistant.create_thread().await.unwrap();
        assistant.add_user_message(&thread, "hi").await.unwrap();
        let run = assistant.create_run(&thread).await.unwrap();

        assistant.retrieve_run(&thread, &run.id).await.unwrap();
        let run = assistant.retrieve_run(&thread, &run.id).await.unwrap();

        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.last_error.is_some());
        assert_eq!(assistant.messages(&thread).await.len(), 1);
    }

    #[tokio::test]
    async fn test_silent_runs_complete_without_reply() {
        let assistant = ScriptedAssistant::new().with_silent_runs_after(1);
        let thread = assistant.create_thread().await.unwrap();

        for text in ["one", "two"] {
            assistant.add_user_message(&thread, text).await.unwrap();
            let run = assistant.create_run(&thread).await.unwrap();
            let run = assistant.retrieve_run(&thread, &run.id).await.unwrap();
            assert_eq!(run.status, RunStatus::Completed);
        }

        let roles: Vec<_> = assistant
            .messages(&thread)
            .await
            .into_iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
    }

    #[tokio::test]
    async fn test_unknown_thread_is_api_error() {
        let assistant = ScriptedAssistant::new();
        let thread = ThreadHandle::new("thread_missing");

        let err = assistant.add_user_message(&thread, "hi").await.unwrap_err();
        assert!(matches!(err, AssistantError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_assistant_name() {
        assert_eq!(ScriptedAssistant::new().name(), "ScriptedAssistant");
    }
}
