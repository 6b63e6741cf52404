//! Read side of the relay: a sequence of update events for one workflow.

use async_trait::async_trait;
use thiserror::Error;

use crate::event::model::WorkflowEvent;

/// Result of one successful call to [`EventReader::read`].
#[derive(Debug)]
pub enum ReadOutcome {
    /// A new snapshot of a still-running workflow.
    Event(WorkflowEvent),
    /// No further events will arrive. Carries the final event when the
    /// triggering snapshot was decoded on the same call, so the consumer
    /// always sees the last state transition before stopping.
    Exhausted(Option<WorkflowEvent>),
}

/// Fatal read failures. Exhaustion is not an error; see [`ReadOutcome`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// A snapshot was received but could not be decoded or translated.
    #[error("workflow update was in an invalid format: {0}")]
    InvalidEvent(String),
    /// The upstream connection failed.
    #[error("couldn't read workflow update from the engine: {0}")]
    ConnectionFailed(String),
}

/// Reads the sequence of update events for a specific workflow.
///
/// A reader is created once per watch session, owns the upstream connection
/// for the session's duration, and is closed exactly once. Callers must stop
/// reading after [`ReadOutcome::Exhausted`].
#[async_trait]
pub trait EventReader: Send {
    /// Blocks until the next snapshot arrives, the stream ends, or the
    /// session budget runs out.
    async fn read(&mut self) -> Result<ReadOutcome, ReadError>;

    /// Releases the upstream connection. Consumes the reader, so a second
    /// close is a compile-time error rather than a runtime condition.
    async fn close(self) -> anyhow::Result<()>;
}
