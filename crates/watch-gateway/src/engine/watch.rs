//! Watch stream: frames the engine's NDJSON watch feed and yields domain
//! events through the [`EventReader`] interface.

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;

use async_trait::async_trait;

use crate::engine::types::WatchMessage;
use crate::event::{EventReader, ReadError, ReadOutcome, WorkflowEvent};
use crate::session::Deadline;

/// One frame of the engine's watch feed.
#[derive(Debug, Deserialize)]
struct WatchEnvelope {
    result: Option<WatchMessage>,
}

/// Stateful reader over the engine's watch stream for one workflow.
///
/// Exclusively owns the upstream connection; closing the reader (or dropping
/// it) tears the connection down.
pub struct WatchStream {
    chunks: BoxStream<'static, Result<Bytes, String>>,
    buf: BytesMut,
    deadline: Deadline,
}

impl WatchStream {
    pub(crate) fn new<S, E>(chunks: S, deadline: Deadline) -> Self
    where
        S: futures::Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        Self {
            chunks: chunks.map(|item| item.map_err(|e| e.to_string())).boxed(),
            buf: BytesMut::new(),
            deadline,
        }
    }

    /// Takes the next complete line out of the buffer, skipping blank lines.
    fn next_line(&mut self) -> Option<Bytes> {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos + 1).freeze();
            if !line.trim_ascii().is_empty() {
                return Some(line);
            }
        }
        None
    }

    /// Decodes one frame. A snapshot in a terminal phase is itself the last
    /// event: it is returned paired with exhaustion so the consumer still
    /// sees the final state transition.
    fn decode(line: &[u8]) -> Result<ReadOutcome, ReadError> {
        let envelope: WatchEnvelope =
            serde_json::from_slice(line).map_err(|e| ReadError::InvalidEvent(e.to_string()))?;
        let message = envelope
            .result
            .ok_or_else(|| ReadError::InvalidEvent("watch frame carried no result".to_string()))?;

        let event = WorkflowEvent::from_watch_message(&message)
            .map_err(|e| ReadError::InvalidEvent(e.to_string()))?;

        if event.is_terminal() {
            Ok(ReadOutcome::Exhausted(Some(event)))
        } else {
            Ok(ReadOutcome::Event(event))
        }
    }
}

#[async_trait]
impl EventReader for WatchStream {
    async fn read(&mut self) -> Result<ReadOutcome, ReadError> {
        loop {
            if let Some(line) = self.next_line() {
                return Self::decode(&line);
            }

            // Budget expiry ends the stream; the caller stops reading.
            if self.deadline.check().is_err() {
                return Ok(ReadOutcome::Exhausted(None));
            }

            match self.deadline.bound(self.chunks.next()).await {
                Err(_) => return Ok(ReadOutcome::Exhausted(None)),
                Ok(None) => {
                    // End of stream; a trailing unterminated line is still a frame.
                    let line = self.buf.split().freeze();
                    if line.trim_ascii().is_empty() {
                        return Ok(ReadOutcome::Exhausted(None));
                    }
                    return Self::decode(&line);
                }
                Ok(Some(Err(e))) => return Err(ReadError::ConnectionFailed(e)),
                Ok(Some(Ok(chunk))) => self.buf.extend_from_slice(&chunk),
            }
        }
    }

    async fn close(self) -> anyhow::Result<()> {
        // Dropping the byte stream releases the underlying HTTP connection.
        tracing::debug!("closing engine watch stream");
        Ok(())
    }
}
