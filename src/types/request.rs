//! Chat completion request parameters.

use super::{FunctionCallMode, FunctionDefinition, Message};
use serde::Serialize;
use std::collections::HashMap;

/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Chat completion request.
///
/// A `Conversation` keeps one of these as its request configuration (with an empty
/// `messages` list) and clones it for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallMode>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            n: None,
            stream: false,
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: None,
            presence_penalty: None,
            frequency_penalty: None,
            logit_bias: None,
            user: None,
            functions: Vec::new(),
            function_call: None,
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub const fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub const fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_logit_bias(mut self, logit_bias: HashMap<String, f32>) -> Self {
        self.logit_bias = Some(logit_bias);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_function(mut self, function: FunctionDefinition) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_function_call(mut self, mode: FunctionCallMode) -> Self {
        self.function_call = Some(mode);
        self
    }

    /// Per-call copy of this configuration carrying a history snapshot.
    ///
    /// Always requests a single choice.
    pub(crate) fn for_call(&self, messages: Vec<Message>, stream: bool) -> Self {
        let mut request = self.clone();
        request.messages = messages;
        request.n = Some(1);
        request.stream = stream;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_tunables_are_omitted() {
        let request = ChatRequest::new("gpt-4")
            .with_temperature(0.5)
            .for_call(vec![Message::user("hi")], true);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4",
                "messages": [{"role": "user", "content": "hi"}],
                "n": 1,
                "stream": true,
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn for_call_leaves_the_template_untouched() {
        let template = ChatRequest::new("gpt-4").with_function(FunctionDefinition::new(
            "f",
            json!({"type": "object"}),
        ));
        let call = template.for_call(vec![Message::user("a")], false);

        assert!(template.messages.is_empty());
        assert_eq!(template.n, None);
        assert_eq!(call.functions.len(), 1);
        assert_eq!(call.messages.len(), 1);
    }
}
