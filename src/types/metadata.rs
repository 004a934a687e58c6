//! Response metadata captured from HTTP headers.

use reqwest::header::HeaderMap;
use std::time::Duration;

pub const ORGANIZATION_HEADER: &str = "openai-organization";
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PROCESSING_MS_HEADER: &str = "openai-processing-ms";
pub const API_VERSION_HEADER: &str = "openai-version";
pub const MODEL_HEADER: &str = "openai-model";

/// Metadata attached to every decoded result.
///
/// Every field is best-effort: a missing or malformed header leaves it `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMetadata {
    pub organization: Option<String>,
    pub request_id: Option<String>,
    pub processing_time: Option<Duration>,
    pub api_version: Option<String>,
    pub model: Option<String>,
}

impl ResultMetadata {
    /// Read metadata from response headers. Never fails.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let processing_time = header_str(headers, PROCESSING_MS_HEADER).and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(e) => {
                    tracing::debug!("Ignoring non-numeric {PROCESSING_MS_HEADER} '{raw}': {e}");
                    None
                }
            }
        });

        Self {
            organization: header_str(headers, ORGANIZATION_HEADER),
            request_id: header_str(headers, REQUEST_ID_HEADER),
            processing_time,
            api_version: header_str(headers, API_VERSION_HEADER),
            model: header_str(headers, MODEL_HEADER),
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    match value.to_str() {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            tracing::debug!("Ignoring unreadable header {name}: {e}");
            None
        }
    }
}

/// Capability shared by every decoded API result.
pub trait ApiResult {
    fn metadata(&self) -> &ResultMetadata;
    fn set_metadata(&mut self, metadata: ResultMetadata);
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn reads_all_known_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ORGANIZATION_HEADER, HeaderValue::from_static("org-1"));
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-9"));
        headers.insert(PROCESSING_MS_HEADER, HeaderValue::from_static("125"));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static("2020-10-01"));
        headers.insert(MODEL_HEADER, HeaderValue::from_static("gpt-4"));

        let meta = ResultMetadata::from_headers(&headers);
        assert_eq!(meta.organization.as_deref(), Some("org-1"));
        assert_eq!(meta.request_id.as_deref(), Some("req-9"));
        assert_eq!(meta.processing_time, Some(Duration::from_millis(125)));
        assert_eq!(meta.api_version.as_deref(), Some("2020-10-01"));
        assert_eq!(meta.model.as_deref(), Some("gpt-4"));
    }

    #[test]
    fn malformed_processing_time_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(PROCESSING_MS_HEADER, HeaderValue::from_static("fast"));
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));

        let meta = ResultMetadata::from_headers(&headers);
        assert_eq!(meta.processing_time, None);
        assert_eq!(meta.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn empty_headers_give_empty_metadata() {
        assert_eq!(
            ResultMetadata::from_headers(&HeaderMap::new()),
            ResultMetadata::default()
        );
    }
}
