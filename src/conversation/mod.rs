//! Multi-turn conversations
//!
//! A [`Conversation`] owns an ordered message history and a request configuration. Each
//! call snapshots the history, clones the configuration, sends the request, and appends
//! the model's reply to history once it is complete.
//!
//! Three ways to obtain a reply:
//! - [`Conversation::get_response`]: one blocking round trip.
//! - [`Conversation::stream_response`]: text tokens delivered to a callback as they arrive.
//! - [`Conversation::stream_response_with_functions`]: text or function calls, dispatched to
//!   a [`FunctionStreamHandler`].

mod handler;

pub use handler::FunctionStreamHandler;

use crate::client::ChatCompletions;
use crate::error::LlmError;
use crate::streaming::{
    AccumulatedResponse, AccumulatorEvent, AccumulatorMode, CancelHandle, ChatResultStream,
    DeltaAccumulator, make_cancellable_stream,
};
use crate::types::{ChatRequest, ChatResult, Message, Role};
use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// Stateful multi-turn chat.
///
/// Calls take `&mut self`, so two calls can never be in flight on one conversation.
pub struct Conversation {
    api: Arc<dyn ChatCompletions>,
    request_config: ChatRequest,
    history: Vec<Message>,
    most_recent_api_result: Option<ChatResult>,
    cancel_handle: Option<CancelHandle>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("request_config", &self.request_config)
            .field("history", &self.history)
            .field("most_recent_api_result", &self.most_recent_api_result)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub fn new(api: Arc<dyn ChatCompletions>, request_config: ChatRequest) -> Self {
        Self {
            api,
            request_config,
            history: Vec::new(),
            most_recent_api_result: None,
            cancel_handle: None,
        }
    }

    /// Stop streaming calls once `handle` is cancelled.
    ///
    /// A cancelled call returns `Ok(())`, dispatches nothing and leaves history unchanged.
    pub fn with_cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel_handle = Some(handle);
        self
    }

    pub fn set_cancel_handle(&mut self, handle: Option<CancelHandle>) {
        self.cancel_handle = handle;
    }

    /// History in prompt order.
    pub fn messages(&self) -> &[Message] {
        &self.history
    }

    pub fn message(&self, id: Uuid) -> Option<&Message> {
        self.history.iter().find(|m| m.id == id)
    }

    /// Last result received: the whole response, or the last fragment of a stream.
    pub fn most_recent_api_result(&self) -> Option<&ChatResult> {
        self.most_recent_api_result.as_ref()
    }

    pub fn request_config(&self) -> &ChatRequest {
        &self.request_config
    }

    /// Mutable request configuration, applied from the next call on.
    pub fn request_config_mut(&mut self) -> &mut ChatRequest {
        &mut self.request_config
    }

    // ------------------------------------------------------------------
    // History editing
    // ------------------------------------------------------------------

    /// Append a message, returning its id.
    pub fn append_message(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.history.push(message);
        id
    }

    pub fn append_system(&mut self, content: impl Into<String>) -> Uuid {
        self.append_message(Message::system(content))
    }

    pub fn append_user(&mut self, content: impl Into<String>) -> Uuid {
        self.append_message(Message::user(content))
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) -> Uuid {
        self.append_message(Message::assistant(content))
    }

    pub fn append_function(&mut self, name: impl Into<String>, content: impl Into<String>) -> Uuid {
        self.append_message(Message::function(name, content))
    }

    /// Insert a message before position `index`.
    pub fn insert_message(&mut self, index: usize, message: Message) -> Result<Uuid, LlmError> {
        if index > self.history.len() {
            return Err(LlmError::InvalidParameter(format!(
                "insert index {index} is out of range for {} messages",
                self.history.len()
            )));
        }
        let id = message.id;
        self.history.insert(index, message);
        Ok(id)
    }

    /// Remove the message with `id`. Returns whether it was found.
    pub fn remove_message(&mut self, id: Uuid) -> bool {
        match self.history.iter().position(|m| m.id == id) {
            Some(index) => {
                self.history.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the content of the message with `id`. Returns whether it was found.
    pub fn edit_content(&mut self, id: Uuid, content: impl Into<String>) -> bool {
        match self.history.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Change the role of the message with `id`. Returns whether it was found.
    pub fn edit_role(&mut self, id: Uuid, role: Role) -> bool {
        match self.history.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.role = role;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Responses
    // ------------------------------------------------------------------

    /// Request a whole reply, append it to history and return its text.
    pub async fn get_response(&mut self) -> Result<String, LlmError> {
        let request = self.request_config.for_call(self.history.clone(), false);
        let result = self.api.create_chat_completion(request).await?;

        let message = result
            .first_choice()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.to_message())
            .ok_or_else(|| LlmError::ParseError("Response contained no message".to_string()))?;

        let text = message.content.clone();
        self.history.push(message);
        self.most_recent_api_result = Some(result);
        Ok(text)
    }

    /// Stream a text reply, calling `on_token` for every token in order.
    ///
    /// Function-call deltas are ignored. The complete reply is appended at stream end.
    pub async fn stream_response<F, Fut>(&mut self, mut on_token: F) -> Result<(), LlmError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<(), LlmError>>,
    {
        let mut stream = self.open_stream().await?;
        let mut accumulator = DeltaAccumulator::new(AccumulatorMode::PlainTextOnly);

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            for event in accumulator.push(&fragment) {
                if let AccumulatorEvent::Token(token) = event {
                    on_token(token).await?;
                }
            }
            self.most_recent_api_result = Some(fragment);
        }

        if self.was_cancelled() {
            return Ok(());
        }

        if let AccumulatedResponse::Text { role, content } = accumulator.finish() {
            self.history.push(Message::new(role, content));
        }
        Ok(())
    }

    /// Stream a reply that may be a function call.
    ///
    /// Text tokens go to [`FunctionStreamHandler::on_token`] as they arrive. Function calls
    /// are buffered and handed over in one batch after the stream ends. The message this
    /// call appends (assistant text or function result) gets `message_id`.
    pub async fn stream_response_with_functions<H>(
        &mut self,
        message_id: Uuid,
        handler: &mut H,
    ) -> Result<(), LlmError>
    where
        H: FunctionStreamHandler + ?Sized,
    {
        let mut stream = self.open_stream().await?;
        let mut accumulator = DeltaAccumulator::new(AccumulatorMode::FunctionAware);

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            for event in accumulator.push(&fragment) {
                match event {
                    AccumulatorEvent::TypeResolved(role) => handler.on_type_resolved(role).await?,
                    AccumulatorEvent::Token(token) => handler.on_token(&token).await?,
                }
            }
            self.most_recent_api_result = Some(fragment);
        }

        if self.was_cancelled() {
            return Ok(());
        }

        match accumulator.finish() {
            AccumulatedResponse::Empty => {}
            AccumulatedResponse::Text { role, content } => {
                self.history
                    .push(Message::new(role, content).with_id(message_id));
            }
            AccumulatedResponse::FunctionCalls(calls) => {
                tracing::debug!(count = calls.len(), "Dispatching function calls");
                let result = handler.on_function_calls(calls).await?;
                if let Some(result) = result.filter(|r| !r.is_empty()) {
                    let message =
                        Message::function(result.name.clone(), result.content.clone())
                            .with_id(message_id);
                    self.history.push(message.clone());
                    handler.on_function_result(&result, &message).await?;
                }
            }
        }
        Ok(())
    }

    async fn open_stream(&self) -> Result<ChatResultStream, LlmError> {
        let request = self.request_config.for_call(self.history.clone(), true);
        let stream = self.api.stream_chat_completion(request).await?;
        Ok(match &self.cancel_handle {
            Some(handle) => make_cancellable_stream(stream, handle.clone()),
            None => stream,
        })
    }

    fn was_cancelled(&self) -> bool {
        let cancelled = self
            .cancel_handle
            .as_ref()
            .is_some_and(CancelHandle::is_cancelled);
        if cancelled {
            tracing::debug!("Streaming call cancelled; discarding buffered response");
        }
        cancelled
    }
}
