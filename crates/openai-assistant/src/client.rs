//! OpenAiAssistant implementation using the Assistants API.

use assistant_core::{async_trait, AssistantApi, AssistantError, Run, ThreadHandle, ThreadMessage};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::api_types::{
    ApiError, CreateMessageRequest, CreateRunRequest, MessageList, RunObject, ThreadObject,
};
use crate::config::AssistantConfig;

/// Beta header required by the Assistants API.
const ASSISTANTS_BETA: &str = "assistants=v2";

/// An assistant backend that talks to the hosted Assistants API.
///
/// Threads live on the service side; this client only holds the HTTP
/// connection pool and configuration, so it is cheap to share behind an `Arc`.
pub struct OpenAiAssistant {
    client: Client,
    config: AssistantConfig,
}

impl OpenAiAssistant {
    /// Create a new OpenAiAssistant with the given configuration.
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                AssistantError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "OpenAiAssistant initialized with assistant: {}, api: {}",
            config.assistant_id, config.api_url
        );

        Ok(Self { client, config })
    }

    /// Create an OpenAiAssistant from environment variables.
    ///
    /// See [`AssistantConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, AssistantError> {
        let config = AssistantConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.config.endpoint(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.post(self.config.endpoint(path)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    /// Send a request and decode a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AssistantError> {
        let response = request
            .send()
            .await
            .map_err(|e| AssistantError::Network(format!("Failed to send request: {}", e)))?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| AssistantError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// Turn a non-success response into an [`AssistantError::Api`].
async fn check_status(response: Response) -> Result<Response, AssistantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &error_text))
}

/// Build the error for a non-success body, falling back to the raw text.
fn api_error(status: u16, body: &str) -> AssistantError {
    let message = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error.error.summary(),
        Err(_) => body.to_string(),
    };

    AssistantError::Api { status, message }
}

#[async_trait]
impl AssistantApi for OpenAiAssistant {
    async fn create_thread(&self) -> Result<ThreadHandle, AssistantError> {
        let thread: ThreadObject = self
            .send(self.post("/threads").json(&serde_json::json!({})))
            .await?;

        debug!("Created thread {}", thread.id);
        Ok(ThreadHandle::new(thread.id))
    }

    async fn add_user_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
    ) -> Result<(), AssistantError> {
        let path = format!("/threads/{}/messages", thread.id());
        let body = CreateMessageRequest {
            role: "user",
            content: text,
        };

        let _: serde_json::Value = self.send(self.post(&path).json(&body)).await?;

        debug!("Added user message to thread {}", thread);
        Ok(())
    }

    async fn create_run(&self, thread: &ThreadHandle) -> Result<Run, AssistantError> {
        let path = format!("/threads/{}/runs", thread.id());
        let body = CreateRunRequest {
            assistant_id: &self.config.assistant_id,
        };

        let run: RunObject = self.send(self.post(&path).json(&body)).await?;

        debug!("Started run {} on thread {} ({})", run.id, thread, run.status);
        Ok(run.into())
    }

    async fn retrieve_run(
        &self,
        thread: &ThreadHandle,
        run_id: &str,
    ) -> Result<Run, AssistantError> {
        let path = format!("/threads/{}/runs/{}", thread.id(), run_id);
        let run: RunObject = self.send(self.get(&path)).await?;
        Ok(run.into())
    }

    async fn list_messages(
        &self,
        thread: &ThreadHandle,
        limit: u32,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        let path = format!("/threads/{}/messages", thread.id());
        let request = self
            .get(&path)
            .query(&[("order", "desc".to_string()), ("limit", limit.to_string())]);

        let list: MessageList = self.send(request).await?;
        Ok(list.data.into_iter().map(Into::into).collect())
    }

    fn name(&self) -> &str {
        "OpenAiAssistant"
    }
}
