//! Watch gateway: relays live workflow progress from a workflow engine to
//! WebSocket subscribers.
//!
//! The engine exposes workflow state as a flat node graph; this crate
//! reconstructs the stage and step hierarchy, streams each update to the
//! subscriber, and ends the session when the workflow reaches a terminal
//! phase or the session budget expires.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod handlers;
pub mod relay;
pub mod session;
pub mod state;
pub mod ws;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;
