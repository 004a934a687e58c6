//! Streaming Module
//!
//! The streaming pipeline, leaves first:
//! - `lines`: byte stream → typed items, one JSON object per line
//! - `decoder`: attaches response metadata to every decoded fragment
//! - `accumulator`: classifies a response as text or function call and assembles it
//! - `cancel`: early termination of a fragment stream

mod accumulator;
mod cancel;
mod decoder;
mod lines;

pub use accumulator::*;
pub use cancel::*;
pub use decoder::*;
pub use lines::*;

use crate::types::ChatResult;

/// Stream of chat completion fragments.
pub type ChatResultStream = DecodedStream<ChatResult>;
