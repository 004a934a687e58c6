//! Error Handling Module
//!
//! Error types for the conversation client:
//! - Core error type (`LlmError`) and its coarse `ErrorCategory`
//! - Classification of OpenAI-style HTTP error bodies
//! - Conversions from common library error types
//!
//! # Example
//!
//! ```rust,ignore
//! use converse::error::{ErrorCategory, LlmError};
//!
//! let error = LlmError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! ```

mod conversions;
pub mod types;

pub use conversions::classify_http_error;
pub use types::*;
