//! WebSocket transport for delivering events to a subscriber.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};

use crate::event::{EventWriter, WorkflowEvent, WriteError};
use crate::session::Deadline;

/// Event writer over an upgraded WebSocket connection.
///
/// Exclusively owns the connection for the lifetime of one relay session.
pub struct EventSocket {
    socket: WebSocket,
    deadline: Deadline,
}

impl EventSocket {
    pub fn new(socket: WebSocket, deadline: Deadline) -> Self {
        Self { socket, deadline }
    }
}

#[async_trait]
impl EventWriter for EventSocket {
    async fn write(&mut self, event: &WorkflowEvent) -> Result<(), WriteError> {
        self.deadline.check().map_err(WriteError::from)?;

        let payload = serde_json::to_string(event)?;

        match self
            .deadline
            .bound(self.socket.send(Message::Text(payload.into())))
            .await
        {
            Err(expiry) => Err(expiry.into()),
            Ok(Err(e)) => Err(WriteError::ConnectionFailed(e.to_string())),
            Ok(Ok(())) => Ok(()),
        }
    }

    async fn close(mut self) -> anyhow::Result<()> {
        // The subscriber may already be gone; closing is best effort.
        if let Err(e) = self.socket.send(Message::Close(None)).await {
            tracing::debug!(error = %e, "subscriber connection already closed");
        }
        Ok(())
    }
}
