//! One provider call, two outputs.
//!
//! A spawned task feeds raw JSON deltas into an unbounded channel (the text
//! stream) and accumulates them; when the upstream ends it parses the buffer
//! and resolves a oneshot (the object future). Sends on the text channel never
//! block, so dropping the text stream cannot stall the object future.

use super::sse::SseDecoder;
use super::ProviderError;
use futures::{Future, Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Raw JSON text as it arrives.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// The complete parsed object, available once the stream ends.
pub type ObjectFuture = Pin<Box<dyn Future<Output = Result<Value, ProviderError>> + Send>>;

/// Both outputs of a structured generation.
pub struct ObjectStream {
    pub text: TextStream,
    pub object: ObjectFuture,
}

impl ObjectStream {
    /// Create a connected sink/stream pair.
    pub fn channel() -> (ObjectSink, ObjectStream) {
        let (text_tx, text_rx) = mpsc::unbounded_channel();
        let (object_tx, object_rx) = oneshot::channel();

        let object: ObjectFuture = Box::pin(async move {
            object_rx
                .await
                .unwrap_or(Err(ProviderError::StreamClosed))
        });

        (
            ObjectSink {
                text_tx,
                object_tx: Some(object_tx),
                buffer: String::new(),
            },
            ObjectStream {
                text: Box::pin(UnboundedReceiverStream::new(text_rx)),
                object,
            },
        )
    }
}

impl std::fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStream").finish_non_exhaustive()
    }
}

/// Producer side of an [`ObjectStream`].
pub struct ObjectSink {
    text_tx: mpsc::UnboundedSender<Result<String, ProviderError>>,
    object_tx: Option<oneshot::Sender<Result<Value, ProviderError>>>,
    buffer: String,
}

impl ObjectSink {
    /// Forward a delta and append it to the accumulated output.
    pub fn push(&mut self, delta: &str) {
        if delta.is_empty() {
            return;
        }
        self.buffer.push_str(delta);
        // Receiver may be gone; the object future still resolves.
        let _ = self.text_tx.send(Ok(delta.to_string()));
    }

    /// Parse the accumulated output and resolve the object future.
    pub fn finish(mut self) {
        let result = serde_json::from_str::<Value>(self.buffer.trim())
            .map_err(|e| ProviderError::Decode(e.to_string()));
        if let Err(e) = &result {
            let _ = self.text_tx.send(Err(e.clone()));
        }
        if let Some(tx) = self.object_tx.take() {
            let _ = tx.send(result);
        }
    }

    /// Fail both outputs.
    pub fn fail(mut self, error: ProviderError) {
        let _ = self.text_tx.send(Err(error.clone()));
        if let Some(tx) = self.object_tx.take() {
            let _ = tx.send(Err(error));
        }
    }
}

/// What a provider-specific parser found in one SSE event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Chunk {
    pub text: Option<String>,
    pub done: bool,
}

/// Drive an SSE response into a fresh [`ObjectStream`].
///
/// `parse` turns one event payload into a [`Chunk`] or a terminal error.
pub fn spawn_sse_pump<F>(response: reqwest::Response, mut parse: F) -> ObjectStream
where
    F: FnMut(&str) -> Result<Chunk, ProviderError> + Send + 'static,
{
    let (mut sink, stream) = ObjectStream::channel();

    tokio::spawn(async move {
        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        while let Some(next) = body.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "Provider stream interrupted");
                    sink.fail(ProviderError::from(e));
                    return;
                }
            };

            for event in decoder.push(&bytes) {
                match parse(&event) {
                    Ok(chunk) => {
                        if let Some(text) = chunk.text.as_deref() {
                            sink.push(text);
                        }
                        if chunk.done {
                            sink.finish();
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Provider stream failed");
                        sink.fail(e);
                        return;
                    }
                }
            }
        }

        if let Some(event) = decoder.finish() {
            match parse(&event) {
                Ok(chunk) => {
                    if let Some(text) = chunk.text.as_deref() {
                        sink.push(text);
                    }
                }
                Err(e) => {
                    sink.fail(e);
                    return;
                }
            }
        }

        sink.finish();
    });

    stream
}
