//! Shared application state for HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::engine::EngineClient;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineClient>,
    pub config: Arc<AppConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let engine = Arc::new(EngineClient::new(config.engine_url.clone()));
        Self {
            engine,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
