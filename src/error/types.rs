//! Core error types.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = LlmError> = std::result::Result<T, E>;

/// Errors produced by the client, the streaming pipeline and conversations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure before or while talking to the server (connect, timeout, I/O).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success status returned by the API.
    ///
    /// `details` holds the raw response body: parsed JSON when the body was JSON,
    /// otherwise the body text as a JSON string.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The API rejected the credentials.
    #[error("Authentication error: {message}")]
    AuthenticationError {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimitError {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Not found: {message}")]
    NotFound {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A response body or stream line could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The response stream failed while being read.
    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Raised by caller-supplied stream handlers.
    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Client,
    Server,
    Network,
    Parsing,
    Configuration,
    Handler,
}

impl LlmError {
    /// Create an `ApiError` without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a `HandlerError`, for use inside stream handlers.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::HandlerError(message.into())
    }

    /// HTTP status associated with this error, when known.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::AuthenticationError { .. } => Some(401),
            Self::RateLimitError { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::InvalidInput { .. } => Some(400),
            _ => None,
        }
    }

    /// Raw response body of an HTTP error: parsed JSON, or the body text as a JSON string.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ApiError { details, .. }
            | Self::AuthenticationError { details, .. }
            | Self::RateLimitError { details, .. }
            | Self::NotFound { details, .. }
            | Self::InvalidInput { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationError { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationError { .. } | Self::MissingApiKey(_) => {
                ErrorCategory::Authentication
            }
            Self::RateLimitError { .. } => ErrorCategory::RateLimit,
            Self::NotFound { .. } | Self::InvalidInput { .. } => ErrorCategory::Client,
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } => ErrorCategory::Client,
            Self::HttpError(_) | Self::StreamError(_) => ErrorCategory::Network,
            Self::ParseError(_) | Self::JsonError(_) => ErrorCategory::Parsing,
            Self::ConfigurationError(_) | Self::InvalidParameter(_) => {
                ErrorCategory::Configuration
            }
            Self::HandlerError(_) => ErrorCategory::Handler,
        }
    }
}
