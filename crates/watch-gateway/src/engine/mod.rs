//! Upstream workflow-engine collaborator: snapshot model, REST client, and
//! the live watch stream.

pub mod client;
pub mod types;
pub mod watch;

pub use client::EngineClient;
pub use watch::WatchStream;
