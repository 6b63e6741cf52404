//! Live watch endpoint: upgrades to WebSocket and relays workflow events
//! until the workflow finishes or the session budget runs out.

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::handlers::validate_params;
use crate::relay;
use crate::session::Deadline;
use crate::state::AppState;
use crate::ws::EventSocket;

/// `GET /api/v1/workflows/{namespace}/{name}` with a WebSocket upgrade.
///
/// The upstream watch is established before the upgrade so that an engine
/// failure surfaces as a plain HTTP error instead of an aborted socket.
pub async fn watch_workflow(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    upgrade: WebSocketUpgrade,
) -> AppResult<Response> {
    validate_params(&namespace, &name)?;

    let deadline = Deadline::new(state.config.session_timeout());
    let reader = state
        .engine
        .watch(&namespace, &name, deadline.clone())
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(%namespace, %name, "starting watch session");

    Ok(upgrade.on_upgrade(move |socket| async move {
        let writer = EventSocket::new(socket, deadline.clone());
        let outcome = relay::run(&deadline, reader, writer).await;
        tracing::info!(%namespace, %name, ?outcome, "watch session ended");
    }))
}
