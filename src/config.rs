//! Client configuration and builder.

use crate::error::LlmError;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ORGANIZATION_ENV: &str = "OPENAI_ORGANIZATION";

/// Connection settings shared by every request of a client.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: SecretString,
    pub organization: Option<String>,
    pub base_url: String,
    /// Ceiling for a whole request, including reading a stream to the end.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub http_extra_headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            organization: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: None,
            http_extra_headers: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("has_api_key", &!self.api_key.expose_secret().is_empty())
            .field("organization", &self.organization)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_extra_headers.insert(name.into(), value.into());
        self
    }

    /// Endpoint URL for `path` under the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::MissingApiKey(format!(
                "set an API key on the builder or via {API_KEY_ENV}"
            )));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LlmError::ConfigurationError(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Builder for [`crate::ChatClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config.api_key = SecretString::from(api_key.into());
        self
    }

    /// Set the organization sent as `OpenAI-Organization`
    pub fn organization<S: Into<String>>(mut self, organization: S) -> Self {
        self.config.organization = Some(organization.into());
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Add a header sent with every request
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.config
            .http_extra_headers
            .insert(name.into(), value.into());
        self
    }

    /// Resolve the final configuration.
    ///
    /// Unset API key and organization fall back to `OPENAI_API_KEY` / `OPENAI_ORGANIZATION`.
    pub fn into_config(self) -> Result<ClientConfig, LlmError> {
        let mut config = self.config;
        if config.api_key.expose_secret().is_empty()
            && let Ok(key) = std::env::var(API_KEY_ENV)
        {
            config.api_key = SecretString::from(key);
        }
        if config.organization.is_none()
            && let Ok(org) = std::env::var(ORGANIZATION_ENV)
            && !org.is_empty()
        {
            config.organization = Some(org);
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the client with its own `reqwest::Client`.
    pub fn build(self) -> Result<crate::ChatClient, LlmError> {
        crate::ChatClient::new(self.into_config()?)
    }
}
