//! # Converse - streaming conversations for chat-completion APIs
//!
//! Converse is a client for OpenAI-style chat completion endpoints built around a stateful,
//! multi-turn [`Conversation`].
//!
//! ## Features
//!
//! - **Streaming first**: responses are decoded lazily from the wire, one fragment at a time.
//! - **Function calling**: function-call arguments are buffered until complete and handed
//!   to your handler in one batch; plain text streams token by token.
//! - **Editable history**: messages are addressed by id and can be inserted, edited and
//!   removed between calls.
//! - **Response metadata**: request id, processing time, API version and model are captured
//!   from response headers on every result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use converse::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let client = ChatClient::builder().api_key("your-api-key").build()?;
//!     let mut conversation = client.conversation(ChatRequest::new("gpt-4"));
//!
//!     conversation.append_system("You are a terse calculator.");
//!     conversation.append_user("2+2?");
//!     conversation
//!         .stream_response(|token| async move {
//!             print!("{token}");
//!             Ok(())
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod headers;
pub mod streaming;
pub mod types;

pub use client::{ChatClient, ChatCompletions};
pub use config::{ClientBuilder, ClientConfig};
pub use conversation::{Conversation, FunctionStreamHandler};
pub use error::{LlmError, Result};

/// Commonly used items.
pub mod prelude {
    pub use crate::client::{ChatClient, ChatCompletions};
    pub use crate::config::{ClientBuilder, ClientConfig};
    pub use crate::conversation::{Conversation, FunctionStreamHandler};
    pub use crate::error::LlmError;
    pub use crate::streaming::CancelHandle;
    pub use crate::types::{
        ChatRequest, ChatResult, FunctionCall, FunctionCallMode, FunctionDefinition,
        FunctionResult, Message, ResultMetadata, Role,
    };
}
