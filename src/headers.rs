//! Request header construction.
//!
//! Centralizes authentication and content headers for every request.

use crate::config::ClientConfig;
use crate::error::LlmError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;

pub const ORGANIZATION_REQUEST_HEADER: &str = "OpenAI-Organization";

/// Build JSON request headers from a config.
///
/// Includes:
/// - `Content-Type: application/json`
/// - `Authorization: Bearer <api_key>`
/// - `OpenAI-Organization` (if present)
/// - `http_extra_headers` passthrough
pub fn build_json_headers(config: &ClientConfig) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut auth: HeaderValue = format!("Bearer {}", config.api_key.expose_secret())
        .parse()
        .map_err(|e| LlmError::InvalidParameter(format!("Invalid API key: {e}")))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    if let Some(org) = config.organization.as_deref()
        && !org.is_empty()
    {
        headers.insert(
            ORGANIZATION_REQUEST_HEADER,
            org.parse().map_err(|e| {
                LlmError::InvalidParameter(format!("Invalid OpenAI-Organization header: {e}"))
            })?,
        );
    }

    for (k, v) in &config.http_extra_headers {
        let header_name: HeaderName = k
            .parse()
            .map_err(|e| LlmError::InvalidParameter(format!("Invalid header name '{k}': {e}")))?;
        let header_value: HeaderValue = v
            .parse()
            .map_err(|e| LlmError::InvalidParameter(format!("Invalid header value '{v}': {e}")))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// JSON headers plus `Accept: text/event-stream`.
pub fn build_stream_headers(config: &ClientConfig) -> Result<HeaderMap, LlmError> {
    let mut headers = build_json_headers(config)?;
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    Ok(headers)
}
