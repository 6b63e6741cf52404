//! Service configuration from environment variables.
//!
//! Every setting carries a default, so the service starts with no
//! environment at all. Variables are prefixed with `WATCH_`, e.g.
//! `WATCH_PORT=9090` or `WATCH_ENGINE_URL=http://argo:2746`.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the workflow engine API.
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// Budget for one watch session, in seconds. Sessions that outlive it
    /// are reported as timed out.
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8084
}

fn default_engine_url() -> String {
    "http://localhost:2746".to_string()
}

fn default_session_timeout_secs() -> u64 {
    3600
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed("WATCH_")
            .from_env::<AppConfig>()
            .context("failed to load configuration from environment")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            engine_url: default_engine_url(),
            session_timeout_secs: default_session_timeout_secs(),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8084");
        assert_eq!(config.engine_url, "http://localhost:2746");
        assert_eq!(config.session_timeout(), Duration::from_secs(3600));
        assert!(!config.debug);
    }

    #[test]
    fn deserializes_with_all_fields_absent() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8084);
        assert_eq!(config.session_timeout_secs, 3600);
    }
}
