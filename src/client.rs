//! HTTP transport for the chat completion endpoint.

use crate::config::{ClientBuilder, ClientConfig};
use crate::conversation::Conversation;
use crate::error::{LlmError, classify_http_error};
use crate::headers::{build_json_headers, build_stream_headers};
use crate::streaming::{ChatResultStream, decode_response_stream};
use crate::types::{ApiResult, ChatRequest, ChatResult, ResultMetadata};
use async_trait::async_trait;
use std::sync::Arc;

pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Chat completion operations a `Conversation` runs on.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    /// Send a request and wait for the whole response.
    async fn create_chat_completion(&self, request: ChatRequest) -> Result<ChatResult, LlmError>;

    /// Send a streaming request and return its fragments.
    async fn stream_chat_completion(
        &self,
        request: ChatRequest,
    ) -> Result<ChatResultStream, LlmError>;
}

/// Client for an OpenAI-style chat completion API.
#[derive(Clone)]
pub struct ChatClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from a config, validating it.
    pub fn new(config: ClientConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            http = http.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            http = http.connect_timeout(timeout);
        }
        let http_client = http.build().map_err(|e| {
            LlmError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client around a caller-provided `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start an empty conversation using `request_config` for every call.
    pub fn conversation(&self, request_config: ChatRequest) -> Conversation {
        Conversation::new(Arc::new(self.clone()), request_config)
    }

    #[tracing::instrument(skip_all, fields(model = %request.model, stream = request.stream))]
    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, LlmError> {
        let url = self.config.endpoint(CHAT_COMPLETIONS_PATH);
        let headers = if request.stream {
            build_stream_headers(&self.config)?
        } else {
            build_json_headers(&self.config)?
        };

        tracing::debug!(
            url = %url,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(classify_http_error(status.as_u16(), &body));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatCompletions for ChatClient {
    async fn create_chat_completion(
        &self,
        mut request: ChatRequest,
    ) -> Result<ChatResult, LlmError> {
        request.stream = false;
        let response = self.send(&request).await?;
        let metadata = ResultMetadata::from_headers(response.headers());
        let body = response.bytes().await?;

        let mut result: ChatResult = serde_json::from_slice(&body).map_err(|e| {
            LlmError::ParseError(format!("Failed to parse chat completion response: {e}"))
        })?;
        result.set_metadata(metadata);
        Ok(result)
    }

    async fn stream_chat_completion(
        &self,
        mut request: ChatRequest,
    ) -> Result<ChatResultStream, LlmError> {
        request.stream = true;
        let response = self.send(&request).await?;
        Ok(decode_response_stream(response))
    }
}
