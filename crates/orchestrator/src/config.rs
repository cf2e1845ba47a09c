//! Orchestrator configuration.

use std::env;
use std::time::Duration;

use crate::poll::PollPolicy;

/// Default number of prior interactions kept in a stored context.
pub const DEFAULT_CONTEXT_LIMIT: usize = 3;

/// Default maximum characters stored for a message or response.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;

/// Configuration for the chat pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// How runs are polled.
    pub poll: PollPolicy,
    /// Prior interactions loaded into and stored with each context.
    pub context_limit: usize,
    /// Maximum characters stored for message and response text.
    pub max_text_chars: usize,
    /// Reply sent instead of running the assistant on a brand new thread.
    pub first_contact_greeting: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            context_limit: DEFAULT_CONTEXT_LIMIT,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            first_contact_greeting: None,
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `MAI_POLL_INTERVAL_MS` - Delay between run status checks (default: 1000)
    /// - `MAI_RUN_TIMEOUT_SECS` - Give up waiting on a run after this long (default: 30)
    /// - `MAI_CONTEXT_LIMIT` - Prior interactions kept per context (default: 3)
    /// - `MAI_MAX_TEXT_CHARS` - Stored text truncation length (default: 10000)
    /// - `MAI_FIRST_CONTACT_GREETING` - Greeting for new threads (default: disabled)
    ///
    /// Unparseable values, and a zero poll interval, fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let interval = parse_var("MAI_POLL_INTERVAL_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll.interval);
        let timeout = parse_var("MAI_RUN_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll.timeout);

        let first_contact_greeting = env::var("MAI_FIRST_CONTACT_GREETING")
            .ok()
            .filter(|g| !g.trim().is_empty());

        Self {
            poll: PollPolicy { interval, timeout },
            context_limit: parse_var("MAI_CONTEXT_LIMIT")
                .map(|v| v as usize)
                .unwrap_or(defaults.context_limit),
            max_text_chars: parse_var("MAI_MAX_TEXT_CHARS")
                .map(|v| v as usize)
                .unwrap_or(defaults.max_text_chars),
            first_contact_greeting,
        }
    }

    /// Create a new config builder.
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

fn parse_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Builder for [`OrchestratorConfig`].
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    /// Set the delay between run status checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    /// Set the overall run timeout.
    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll.timeout = timeout;
        self
    }

    /// Set how many prior interactions a context keeps.
    pub fn context_limit(mut self, limit: usize) -> Self {
        self.config.context_limit = limit;
        self
    }

    /// Set the stored text truncation length.
    pub fn max_text_chars(mut self, max: usize) -> Self {
        self.config.max_text_chars = max;
        self
    }

    /// Enable the first-contact greeting.
    pub fn first_contact_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.config.first_contact_greeting = Some(greeting.into());
        self
    }

    /// Build the config.
    pub fn build(self) -> OrchestratorConfig {
        self.config
    }
}
