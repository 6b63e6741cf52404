//! HTTP client for the workflow engine's REST API.

use std::time::Duration;

use anyhow::Context;

use crate::engine::types::{WorkflowList, WorkflowSnapshot};
use crate::engine::watch::WatchStream;
use crate::session::Deadline;

/// Client for the workflow engine.
///
/// One client is shared across requests; each watch call produces its own
/// exclusively-owned stream.
#[derive(Clone, Debug)]
pub struct EngineClient {
    base_url: String,
    http: reqwest::Client,
}

impl EngineClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            // No overall request timeout: watch connections stay open for
            // the whole session budget.
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Begin watching updates for one workflow.
    /// `GET /api/v1/workflow-events/{namespace}?listOptions.fieldSelector=metadata.name={name}`
    ///
    /// The returned stream yields full snapshots, newest state each time.
    pub async fn watch(
        &self,
        namespace: &str,
        name: &str,
        deadline: Deadline,
    ) -> anyhow::Result<WatchStream> {
        let url = self.url(&format!("/api/v1/workflow-events/{namespace}"));
        let response = self
            .http
            .get(&url)
            .query(&[("listOptions.fieldSelector", format!("metadata.name={name}"))])
            .send()
            .await
            .context("watch workflow: send")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("watch workflow failed: {status}");
        }

        Ok(WatchStream::new(response.bytes_stream(), deadline))
    }

    /// List current workflow snapshots in a namespace.
    /// `GET /api/v1/workflows/{namespace}`
    pub async fn list(&self, namespace: &str) -> anyhow::Result<Vec<WorkflowSnapshot>> {
        let url = self.url(&format!("/api/v1/workflows/{namespace}"));
        let res = self.http.get(&url).send().await.context("list workflows: send")?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("list workflows failed: {status} - {body}");
        }

        let parsed: WorkflowList = serde_json::from_str(&body).context("parse workflow list")?;
        Ok(parsed.items)
    }

    /// Fetch one workflow snapshot.
    /// `GET /api/v1/workflows/{namespace}/{name}`
    pub async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<WorkflowSnapshot> {
        let url = self.url(&format!("/api/v1/workflows/{namespace}/{name}"));
        let res = self.http.get(&url).send().await.context("get workflow: send")?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("get workflow failed: {status} - {body}");
        }

        serde_json::from_str(&body).context("parse workflow snapshot")
    }

    /// Stop a running workflow and return its resulting snapshot.
    /// `PUT /api/v1/workflows/{namespace}/{name}/stop`
    pub async fn stop(&self, namespace: &str, name: &str) -> anyhow::Result<WorkflowSnapshot> {
        let url = self.url(&format!("/api/v1/workflows/{namespace}/{name}/stop"));
        let res = self.http.put(&url).send().await.context("stop workflow: send")?;

        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("stop workflow failed: {status} - {body}");
        }

        serde_json::from_str(&body).context("parse workflow snapshot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = EngineClient::new("http://localhost:2746/");
        assert_eq!(
            client.url("/api/v1/workflows/litmus"),
            "http://localhost:2746/api/v1/workflows/litmus"
        );
    }
}
