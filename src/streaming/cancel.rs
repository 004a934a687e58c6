//! Cancellation utilities
//!
//! A shared token that ends a fragment stream early. Wrapped streams stop as soon as the
//! token fires, even while waiting on the network; dropping them closes the HTTP connection
//! so the server stops generating tokens.

use super::lines::DecodedStream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Any wrapped stream observing this handle stops immediately.
    /// The handle stays cancelled; use a fresh one for the next call.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Make a stream stop once `handle` is cancelled.
pub fn make_cancellable_stream<T>(stream: DecodedStream<T>, handle: CancelHandle) -> DecodedStream<T>
where
    T: Send + 'static,
{
    let mut inner = stream;
    let s = async_stream::stream! {
        loop {
            let next = tokio::select! {
                biased;
                _ = handle.cancelled() => {
                    tracing::debug!("Stream cancelled");
                    break;
                }
                item = inner.next() => item,
            };
            match next {
                Some(item) => yield item,
                None => break,
            }
        }
    };
    Box::pin(s)
}
