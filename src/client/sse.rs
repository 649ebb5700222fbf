//! Client side of the SSE bridge.
//!
//! Wraps an HTTP response body in [`SseDecoder`] and exposes the decoded
//! task updates one at a time. Nothing is read from the connection until an
//! item is requested.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::error::{A2AError, A2AResult};
use crate::sse::SseDecoder;
use crate::types::{JsonRpcError, TaskUpdateEvent};

/// A stream of task updates received over SSE.
///
/// The sequence ends after the first `final` update or when the server
/// closes the connection. A frame that cannot be decoded yields an
/// `Err` for that frame and decoding continues; a connection failure
/// yields one [`A2AError::Transport`] and ends the sequence.
///
/// # Example
///
/// ```no_run
/// # async fn example(mut stream: a2a_min::client::SseStream) {
/// while let Some(update) = stream.next().await {
///     match update {
///         Ok(update) => println!("{}: final={}", update.kind(), update.is_final()),
///         Err(e) => eprintln!("Stream error: {}", e),
///     }
/// }
/// # }
/// ```
pub struct SseStream {
    inner: BoxStream<'static, A2AResult<TaskUpdateEvent>>,
}

impl fmt::Debug for SseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseStream").finish_non_exhaustive()
    }
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<A2AResult<TaskUpdateEvent>>,
    finished: bool,
}

impl SseStream {
    /// Decode the body of a streaming HTTP response.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        Self::from_byte_stream(response.bytes_stream())
    }

    /// Decode an arbitrary stream of body chunks.
    ///
    /// Useful for custom [`Transport`](super::Transport) implementations.
    pub fn from_byte_stream<S, B, E>(body: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let state = DecodeState {
            body: Box::pin(body),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        };

        let inner = stream::unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.pending.pop_front() {
                    if matches!(&item, Ok(update) if update.is_final()) {
                        state.pending.clear();
                        state.finished = true;
                    }
                    return Some((item, state));
                }
                if state.finished {
                    return None;
                }
                match state.body.next().await {
                    Some(Ok(chunk)) => {
                        let items = state.decoder.push(chunk.as_ref());
                        state.pending.extend(items.into_iter().map(typed));
                    }
                    Some(Err(e)) => {
                        state.finished = true;
                        let err = A2AError::Transport(format!("error reading SSE stream: {e}"));
                        return Some((Err(err), state));
                    }
                    None => {
                        state.finished = true;
                        let items = state.decoder.finish();
                        state.pending.extend(items.into_iter().map(typed));
                    }
                }
            }
        });

        Self {
            inner: inner.boxed(),
        }
    }

    /// The next update, or `None` once the sequence has ended.
    pub async fn next(&mut self) -> Option<A2AResult<TaskUpdateEvent>> {
        self.inner.next().await
    }

    /// Collect every remaining update, stopping at the first error.
    pub async fn collect_updates(mut self) -> A2AResult<Vec<TaskUpdateEvent>> {
        let mut updates = Vec::new();
        while let Some(update) = self.next().await {
            updates.push(update?);
        }
        Ok(updates)
    }

    /// Convert into a `futures::Stream`.
    pub fn into_stream(self) -> SseStreamAdapter {
        SseStreamAdapter { inner: self.inner }
    }
}

/// `futures::Stream` view of an [`SseStream`], created by
/// [`SseStream::into_stream`].
pub struct SseStreamAdapter {
    inner: BoxStream<'static, A2AResult<TaskUpdateEvent>>,
}

impl fmt::Debug for SseStreamAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseStreamAdapter").finish_non_exhaustive()
    }
}

impl Stream for SseStreamAdapter {
    type Item = A2AResult<TaskUpdateEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Error frames decode as raw JSON-RPC errors; give them their typed variant.
fn typed(item: A2AResult<TaskUpdateEvent>) -> A2AResult<TaskUpdateEvent> {
    item.map_err(|e| match e {
        A2AError::JsonRpc {
            code,
            message,
            data,
        } => A2AError::from_rpc(JsonRpcError {
            code,
            message,
            data,
        }),
        other => other,
    })
}
