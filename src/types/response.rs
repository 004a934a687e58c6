//! Chat completion results.
//!
//! The same `ChatResult` shape is used for whole responses (`choices[].message`) and for
//! stream fragments (`choices[].delta`).

use super::{ApiResult, Message, ResultMetadata, Role};
use serde::{Deserialize, Serialize};

/// Function-call piece of a streamed delta (or a whole call in a non-streamed message).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Incremental content of one stream fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDelta>,
}

/// Assistant message of a non-streamed choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDelta>,
}

impl ChoiceMessage {
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Convert into a history entry with a fresh id.
    pub fn to_message(&self) -> Message {
        Message {
            name: self.name.clone(),
            ..Message::new(self.role, self.text())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChoiceMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChatDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// A chat completion response or one stream fragment of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip)]
    pub metadata: ResultMetadata,
}

impl ChatResult {
    pub fn first_choice(&self) -> Option<&ChatChoice> {
        self.choices.first()
    }

    /// Delta of the first choice, for stream fragments.
    pub fn first_delta(&self) -> Option<&ChatDelta> {
        self.first_choice().and_then(|c| c.delta.as_ref())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.first_choice().and_then(|c| c.finish_reason.as_deref())
    }

    /// Text of the first choice's message, for whole responses.
    pub fn first_text(&self) -> Option<&str> {
        self.first_choice()
            .and_then(|c| c.message.as_ref())
            .map(ChoiceMessage::text)
    }

    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.created
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
    }
}

impl ApiResult for ChatResult {
    fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: ResultMetadata) {
        self.metadata = metadata;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_stream_fragment() {
        let fragment: ChatResult = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1694268190,
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "delta": {"role": "assistant", "content": null,
                          "function_call": {"name": "get_weather", "arguments": ""}},
                "finish_reason": null
            }]
        }))
        .expect("fragment");

        let delta = fragment.first_delta().expect("delta");
        assert_eq!(delta.role, Some(Role::Assistant));
        assert_eq!(delta.content, None);
        assert_eq!(
            delta.function_call.as_ref().and_then(|f| f.name.as_deref()),
            Some("get_weather")
        );
        assert_eq!(fragment.finish_reason(), None);
        assert!(fragment.created_at().is_some());
    }

    #[test]
    fn parses_whole_response() {
        let result: ChatResult = serde_json::from_value(json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "4"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10}
        }))
        .expect("result");

        assert_eq!(result.first_text(), Some("4"));
        assert_eq!(result.finish_reason(), Some("stop"));
        assert_eq!(result.usage.as_ref().map(|u| u.total_tokens), Some(10));

        let message = result.choices[0].message.as_ref().unwrap().to_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "4");
    }
}
