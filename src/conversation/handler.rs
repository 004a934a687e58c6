//! Callbacks for function-aware streaming.

use crate::error::LlmError;
use crate::types::{FunctionCall, FunctionResult, Message, Role};
use async_trait::async_trait;

/// Receives the events of [`super::Conversation::stream_response_with_functions`].
///
/// Every method is awaited in place: fragment consumption pauses until it returns.
/// An error aborts the call and nothing is appended to history.
#[async_trait]
pub trait FunctionStreamHandler: Send {
    /// The response type was decided; `Role::Function` means a function call follows.
    /// Called exactly once per response that carries a role or function call.
    async fn on_type_resolved(&mut self, _role: Role) -> Result<(), LlmError> {
        Ok(())
    }

    /// A text token, in arrival order. Never called for function-call responses.
    async fn on_token(&mut self, _token: &str) -> Result<(), LlmError> {
        Ok(())
    }

    /// All function calls of the response, once the stream has ended.
    ///
    /// A returned non-empty result is appended to history as a Function-role message.
    async fn on_function_calls(
        &mut self,
        calls: Vec<FunctionCall>,
    ) -> Result<Option<FunctionResult>, LlmError>;

    /// Called after a function result has been appended to history.
    async fn on_function_result(
        &mut self,
        _result: &FunctionResult,
        _message: &Message,
    ) -> Result<(), LlmError> {
        Ok(())
    }
}
