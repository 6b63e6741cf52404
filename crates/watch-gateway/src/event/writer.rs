//! Write side of the relay: delivers events to a connected subscriber.

use async_trait::async_trait;
use thiserror::Error;

use crate::event::model::WorkflowEvent;
use crate::session::Expiry;

/// Write failures, with expiry kept observably distinct from hard failures:
/// a timeout ends the session quietly, a hard failure is worth an error log.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("session deadline exceeded before the event could be sent")]
    DeadlineExceeded,
    #[error("session was cancelled before the event could be sent")]
    Cancelled,
    #[error("couldn't encode event as JSON: {0}")]
    EncodeFailed(#[from] serde_json::Error),
    #[error("couldn't send event to the subscriber: {0}")]
    ConnectionFailed(String),
}

impl WriteError {
    /// True for deadline/cancellation outcomes, the benign end of a session.
    pub fn is_expiry(&self) -> bool {
        matches!(self, WriteError::DeadlineExceeded | WriteError::Cancelled)
    }
}

impl From<Expiry> for WriteError {
    fn from(expiry: Expiry) -> Self {
        match expiry {
            Expiry::Deadline => WriteError::DeadlineExceeded,
            Expiry::Cancelled => WriteError::Cancelled,
        }
    }
}

/// Writes events for a specific workflow to the downstream connection.
///
/// A writer is created once per watch session, owns the downstream
/// connection for the session's duration, and is closed exactly once.
#[async_trait]
pub trait EventWriter: Send {
    /// Serializes and transmits one event, honoring the session deadline:
    /// an already-exhausted budget fails without attempting transmission.
    async fn write(&mut self, event: &WorkflowEvent) -> Result<(), WriteError>;

    /// Releases the downstream connection, best effort. Consumes the writer.
    async fn close(self) -> anyhow::Result<()>;
}
