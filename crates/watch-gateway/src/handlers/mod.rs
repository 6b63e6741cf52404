//! HTTP request handlers.

pub mod health;
pub mod watch;
pub mod workflows;

use crate::error::{AppError, AppResult};

/// Path parameters must be non-blank; the engine API treats empty segments
/// as a different resource.
pub(crate) fn validate_params(namespace: &str, name: &str) -> AppResult<()> {
    if namespace.trim().is_empty() || name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "namespace and workflow name must not be empty".to_string(),
        ));
    }
    Ok(())
}
