//! Function calling types.

use crate::error::LlmError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A function the model may call, advertised in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// How the model should pick functions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FunctionCallMode {
    #[default]
    Auto,
    None,
    /// Force a call to the named function.
    Named(String),
}

impl Serialize for FunctionCallMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            FunctionCallMode::Auto => serializer.serialize_str("auto"),
            FunctionCallMode::None => serializer.serialize_str("none"),
            FunctionCallMode::Named(name) => {
                serde_json::json!({ "name": name }).serialize(serializer)
            }
        }
    }
}

/// A function invocation assembled from streamed fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON arguments text, exactly as concatenated from the stream.
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Deserialize the arguments into a typed value.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T, LlmError> {
        serde_json::from_str(&self.arguments).map_err(|e| {
            LlmError::ParseError(format!(
                "Invalid arguments for function '{}': {e}",
                self.name
            ))
        })
    }
}

/// Output of a caller's function handler, fed back to the model as a Function-role message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionResult {
    pub name: String,
    /// JSON-encoded result.
    pub content: String,
}

impl FunctionResult {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Encode `value` as the JSON content of a result.
    pub fn from_value<T: Serialize>(name: impl Into<String>, value: &T) -> Result<Self, LlmError> {
        Ok(Self::new(name, serde_json::to_string(value)?))
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn function_call_mode_serializes_like_the_api() {
        assert_eq!(serde_json::to_value(FunctionCallMode::Auto).unwrap(), json!("auto"));
        assert_eq!(serde_json::to_value(FunctionCallMode::None).unwrap(), json!("none"));
        assert_eq!(
            serde_json::to_value(FunctionCallMode::Named("f".into())).unwrap(),
            json!({"name": "f"})
        );
    }

    #[test]
    fn parse_arguments_reports_function_name() {
        #[derive(Debug, Deserialize)]
        struct Args {
            x: i32,
        }
        let ok = FunctionCall::new("f", r#"{"x":1}"#);
        assert_eq!(ok.parse_arguments::<Args>().unwrap().x, 1);

        let bad = FunctionCall::new("f", r#"{"x":"#);
        let err = bad.parse_arguments::<Args>().unwrap_err();
        assert!(err.to_string().contains("'f'"));
    }

    #[test]
    fn default_result_is_empty() {
        assert!(FunctionResult::default().is_empty());
        assert!(!FunctionResult::from_value("f", &json!({"ok": true})).unwrap().is_empty());
    }
}
