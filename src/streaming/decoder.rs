//! Streaming result decoding with response metadata.

use super::lines::{DecodedStream, decode_lines};
use crate::error::LlmError;
use crate::types::{ApiResult, ResultMetadata};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// Decode a streamed body, stamping every item with metadata read once from `headers`.
pub fn decode_result_stream<T, S>(headers: &HeaderMap, byte_stream: S) -> DecodedStream<T>
where
    T: ApiResult + DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<Bytes, LlmError>> + Send + 'static,
{
    let metadata = ResultMetadata::from_headers(headers);
    tracing::debug!(
        request_id = ?metadata.request_id,
        model = ?metadata.model,
        "Captured stream metadata"
    );

    let stream = decode_lines::<T, _>(byte_stream).map(move |item| {
        item.map(|mut result| {
            result.set_metadata(metadata.clone());
            result
        })
    });
    Box::pin(stream)
}

/// Decode a streaming HTTP response.
pub fn decode_response_stream<T>(response: reqwest::Response) -> DecodedStream<T>
where
    T: ApiResult + DeserializeOwned + Send + 'static,
{
    let headers = response.headers().clone();
    let byte_stream = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(|e| LlmError::HttpError(format!("Stream error: {e}"))));
    decode_result_stream(&headers, byte_stream)
}
