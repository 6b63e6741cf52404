//! One-shot workflow endpoints: list, current status, and stop.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::event::WorkflowEvent;
use crate::handlers::validate_params;
use crate::state::AppState;

/// `GET /api/v1/workflows/{namespace}`
///
/// Snapshots that cannot be converted are skipped with a warning so one
/// malformed workflow does not hide the rest of the namespace.
pub async fn list_workflows(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> AppResult<Json<Vec<WorkflowEvent>>> {
    if namespace.trim().is_empty() {
        return Err(AppError::BadRequest("namespace must not be empty".to_string()));
    }

    let snapshots = state
        .engine
        .list(&namespace)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let mut events = Vec::with_capacity(snapshots.len());
    for snapshot in &snapshots {
        match WorkflowEvent::from_snapshot(snapshot) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(workflow = %snapshot.metadata.name, error = %e, "skipping workflow");
            }
        }
    }
    Ok(Json(events))
}

/// `GET /api/v1/workflows/{namespace}/{name}/status`
pub async fn get_workflow(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> AppResult<Json<WorkflowEvent>> {
    validate_params(&namespace, &name)?;

    let snapshot = state
        .engine
        .get(&namespace, &name)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let event =
        WorkflowEvent::from_snapshot(&snapshot).map_err(|e| AppError::Conversion(e.to_string()))?;
    Ok(Json(event))
}

/// `POST /api/v1/workflows/{namespace}/{name}/stop`
pub async fn stop_workflow(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> AppResult<Json<WorkflowEvent>> {
    validate_params(&namespace, &name)?;

    let snapshot = state
        .engine
        .stop(&namespace, &name)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(%namespace, %name, "workflow stop requested");

    let event =
        WorkflowEvent::from_snapshot(&snapshot).map_err(|e| AppError::Conversion(e.to_string()))?;
    Ok(Json(event))
}
