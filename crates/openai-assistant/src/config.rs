//! Configuration for OpenAiAssistant.

use std::env;
use std::time::Duration;

use assistant_core::AssistantError;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Default per-request HTTP timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for OpenAiAssistant.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// API base URL (without the `/v1` suffix).
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Identifier of the hosted assistant that runs are started against.
    pub assistant_id: String,

    /// Timeout for each individual HTTP request.
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            assistant_id: String::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AssistantConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OPENAI_API_KEY` - API key for authentication
    /// - `ASSISTANT_ID` - Hosted assistant identifier
    ///
    /// Optional environment variables:
    /// - `OPENAI_API_URL` - API URL (default: https://api.openai.com)
    /// - `OPENAI_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
    pub fn from_env() -> Result<Self, AssistantError> {
        let api_key = required_var("OPENAI_API_KEY")?;
        let assistant_id = required_var("ASSISTANT_ID")?;

        let api_url = env::var("OPENAI_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let request_timeout = env::var("OPENAI_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));

        Ok(Self {
            api_url,
            api_key,
            assistant_id,
            request_timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }

    /// Full URL for an API path such as `/threads`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/v1{}", self.api_url, path)
    }
}

fn required_var(name: &str) -> Result<String, AssistantError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AssistantError::Configuration(format!("{} not set", name))),
    }
}

/// Builder for AssistantConfig.
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the assistant identifier.
    pub fn assistant_id(mut self, id: impl Into<String>) -> Self {
        self.config.assistant_id = id.into();
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AssistantConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssistantConfig::default();

        assert_eq!(config.api_url, "https://api.openai.com");
        assert!(config.api_key.is_empty());
        assert!(config.assistant_id.is_empty());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_all_options() {
        let config = AssistantConfig::builder()
            .api_key("sk-test")
            .api_url("http://localhost:9999")
            .assistant_id("asst_123")
            .request_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.assistant_id, "asst_123");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint() {
        let config = AssistantConfig::default();
        assert_eq!(
            config.endpoint("/threads/thread_1/runs"),
            "https://api.openai.com/v1/threads/thread_1/runs"
        );
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_vars() {
            std::env::remove_var("OPENAI_API_KEY");
            std::env::remove_var("ASSISTANT_ID");
            std::env::remove_var("OPENAI_API_URL");
            std::env::remove_var("OPENAI_REQUEST_TIMEOUT_SECS");
        }

        // Scenario 1: Missing API key should error
        clear_all_vars();
        std::env::set_var("ASSISTANT_ID", "asst_123");
        match AssistantConfig::from_env() {
            Err(AssistantError::Configuration(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Scenario 2: Missing assistant id should error
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        match AssistantConfig::from_env() {
            Err(AssistantError::Configuration(msg)) => assert!(msg.contains("ASSISTANT_ID")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Scenario 3: Required vars only, defaults used
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("ASSISTANT_ID", "asst_123");
        let config = AssistantConfig::from_env().unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.assistant_id, "asst_123");
        assert_eq!(config.api_url, "https://api.openai.com");
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        // Scenario 4: All vars set, trailing slash trimmed
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", "sk-full");
        std::env::set_var("ASSISTANT_ID", "asst_full");
        std::env::set_var("OPENAI_API_URL", "http://proxy.local/");
        std::env::set_var("OPENAI_REQUEST_TIMEOUT_SECS", "12");
        let config = AssistantConfig::from_env().unwrap();
        assert_eq!(config.api_url, "http://proxy.local");
        assert_eq!(config.request_timeout, Duration::from_secs(12));

        // Scenario 5: Blank values count as missing
        clear_all_vars();
        std::env::set_var("OPENAI_API_KEY", "  ");
        std::env::set_var("ASSISTANT_ID", "asst_123");
        assert!(AssistantConfig::from_env().is_err());

        clear_all_vars();
    }
}
