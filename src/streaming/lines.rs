//! Line-delimited JSON stream decoding
//!
//! Turns a raw byte stream into typed items, one JSON object per line. Lines may carry an
//! SSE `data:` prefix or be raw JSON. Blank lines and `:` comment/heartbeat lines are
//! skipped, `[DONE]` ends the stream cleanly, and a line that fails to decode ends the
//! stream with a `ParseError`.

use crate::error::LlmError;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::pin::Pin;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

/// End-of-stream sentinel.
pub const DONE_MARKER: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";

/// Longest line accepted before the stream fails with `StreamError`.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Lazy, single-pass stream of decoded items.
pub type DecodedStream<T> = Pin<Box<dyn Stream<Item = Result<T, LlmError>> + Send>>;

/// What a single line means once framing is removed.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Done,
    Skip,
    Payload(&'a str),
}

fn classify_line(line: &str) -> LineKind<'_> {
    let text = line.strip_prefix(DATA_PREFIX).unwrap_or(line).trim_start();
    if text == DONE_MARKER {
        LineKind::Done
    } else if text.is_empty() || text.starts_with(':') {
        LineKind::Skip
    } else {
        LineKind::Payload(text)
    }
}

/// Decode a byte stream into items of `T`, one per meaningful line.
///
/// A JSON `null` line decodes to no item and is skipped; malformed JSON is fatal.
pub fn decode_lines<T, S>(byte_stream: S) -> DecodedStream<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<Bytes, LlmError>> + Send + 'static,
{
    decode_lines_with_max_length(byte_stream, MAX_LINE_LENGTH)
}

/// [`decode_lines`] with a custom line length limit.
pub fn decode_lines_with_max_length<T, S>(byte_stream: S, max_length: usize) -> DecodedStream<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<Bytes, LlmError>> + Send + 'static,
{
    let io_stream = Box::pin(byte_stream.map(|chunk| chunk.map_err(std::io::Error::other)));
    let codec = LinesCodec::new_with_max_length(max_length);
    let mut lines = FramedRead::new(StreamReader::new(io_stream), codec);

    let out = async_stream::stream! {
        while let Some(item) = lines.next().await {
            let line = match item {
                Ok(line) => line,
                Err(e) => {
                    yield Err(LlmError::StreamError(format!("Failed to read stream line: {e}")));
                    return;
                }
            };

            let payload = match classify_line(&line) {
                LineKind::Done => {
                    tracing::debug!("Stream reached {DONE_MARKER}");
                    return;
                }
                LineKind::Skip => {
                    tracing::trace!("Skipping empty or comment line");
                    continue;
                }
                LineKind::Payload(payload) => payload,
            };

            match serde_json::from_str::<Option<T>>(payload) {
                Ok(Some(value)) => yield Ok(value),
                Ok(None) => {
                    tracing::trace!("Skipping null stream payload");
                }
                Err(e) => {
                    yield Err(LlmError::ParseError(format!(
                        "Failed to parse stream line: {e}"
                    )));
                    return;
                }
            }
        }
    };

    Box::pin(out)
}
