//! Conversions into `LlmError` and HTTP error classification.

use super::types::LlmError;
use serde_json::Value;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::HttpError(format!("Request timed out: {err}"))
        } else if err.is_connect() {
            LlmError::HttpError(format!("Connection failed: {err}"))
        } else if err.is_decode() {
            LlmError::ParseError(format!("Failed to decode response body: {err}"))
        } else {
            LlmError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::JsonError(err.to_string())
    }
}

/// Classify a non-success HTTP response.
///
/// OpenAI-style APIs return `{ "error": { "message": "...", "type": "...", "code": "..." } }`.
/// The structured `type`/`code` wins; otherwise the status decides. Every variant keeps the
/// raw body in `details`: parsed JSON, or the body text as a JSON string.
pub fn classify_http_error(status: u16, body_text: &str) -> LlmError {
    let json: Option<Value> = serde_json::from_str(body_text).ok();
    let error_obj = json.as_ref().and_then(|j| j.get("error"));

    let message = error_obj
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body_text.to_string());
    let error_type = error_obj
        .and_then(|e| e.get("type"))
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let error_code = error_obj
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let is_auth =
        status == 401 || error_type == "authentication_error" || error_code == "invalid_api_key";
    let details = Some(json.unwrap_or_else(|| Value::String(body_text.to_string())));

    if is_auth {
        return LlmError::AuthenticationError { message, details };
    }

    match status {
        429 => LlmError::RateLimitError { message, details },
        404 => LlmError::NotFound { message, details },
        400 => LlmError::InvalidInput { message, details },
        _ => LlmError::ApiError {
            code: status,
            message,
            details,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_openai_envelope_auth_error() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","param":"p","code":"invalid_api_key"}}"#;
        match classify_http_error(401, body) {
            LlmError::AuthenticationError { message, details } => {
                assert_eq!(message, "Incorrect API key provided");
                let details = details.expect("raw body");
                assert_eq!(details["error"]["param"], "p");
                assert_eq!(details["error"]["type"], "invalid_request_error");
                assert_eq!(details["error"]["code"], "invalid_api_key");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn auth_code_wins_over_status() {
        let body = r#"{"error":{"message":"revoked","type":"authentication_error","code":null}}"#;
        let err = classify_http_error(403, body);
        assert!(err.is_auth_error());
        assert_eq!(err.details().map(|d| &d["error"]["message"]), Some(&Value::from("revoked")));
    }

    #[test]
    fn client_errors_keep_plain_text_body() {
        let err = classify_http_error(404, "no such model");
        assert!(matches!(&err, LlmError::NotFound { message, .. } if message == "no such model"));
        assert_eq!(err.details(), Some(&Value::String("no such model".into())));

        let err = classify_http_error(400, r#"{"error":{"message":"bad","param":"messages"}}"#);
        assert!(matches!(&err, LlmError::InvalidInput { .. }));
        assert_eq!(err.details().map(|d| &d["error"]["param"]), Some(&Value::from("messages")));
    }

    #[test]
    fn keeps_raw_body_for_server_errors() {
        match classify_http_error(502, "upstream exploded") {
            LlmError::ApiError {
                code,
                message,
                details,
            } => {
                assert_eq!(code, 502);
                assert_eq!(message, "upstream exploded");
                assert_eq!(details, Some(Value::String("upstream exploded".into())));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn maps_rate_limit_status() {
        let body = r#"{"error":{"message":"slow down","type":"requests","code":null}}"#;
        assert!(matches!(
            classify_http_error(429, body),
            LlmError::RateLimitError { message, details: Some(_) } if message == "slow down"
        ));
    }
}
