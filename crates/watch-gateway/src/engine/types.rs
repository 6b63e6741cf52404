//! Engine-native workflow snapshot model.
//!
//! These types mirror the wire shape the orchestration engine reports and
//! are consumed as input only; the gateway never writes them back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Object metadata attached to a workflow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// Metadata carried by a template definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateMetadata {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// A template specification entry, referenced by name from execution nodes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Template {
    pub name: String,
    pub metadata: TemplateMetadata,
}

/// Kind of an execution node. `StepGroup` nodes represent stages; every
/// other kind represents a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum NodeKind {
    Pod,
    Container,
    Steps,
    StepGroup,
    DAG,
    TaskGroup,
    Retry,
    Skipped,
    Suspend,
    HTTP,
    Plugin,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Pod => "Pod",
            NodeKind::Container => "Container",
            NodeKind::Steps => "Steps",
            NodeKind::StepGroup => "StepGroup",
            NodeKind::DAG => "DAG",
            NodeKind::TaskGroup => "TaskGroup",
            NodeKind::Retry => "Retry",
            NodeKind::Skipped => "Skipped",
            NodeKind::Suspend => "Suspend",
            NodeKind::HTTP => "HTTP",
            NodeKind::Plugin => "Plugin",
            NodeKind::Unknown => "Unknown",
        }
    }
}

/// Lifecycle phase reported by the engine for workflows and nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Phase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Error,
    Skipped,
    Omitted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Phase {
    /// Normalized lowercase form used in the domain event vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::Running => "running",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
            Phase::Error => "error",
            Phase::Skipped => "skipped",
            Phase::Omitted => "omitted",
            Phase::Unknown => "unknown",
        }
    }
}

/// Status of one execution node in the flat node graph.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStatus {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub template_name: String,
    pub phase: Phase,
    /// Child node identifiers, in execution order.
    pub children: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pod_ip: String,
}

/// Workflow-level status, including the full node graph.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowStatus {
    pub phase: Phase,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Node graph keyed by node identifier.
    pub nodes: BTreeMap<String, NodeStatus>,
}

/// The workflow specification part of a snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowSpec {
    pub templates: Vec<Template>,
}

/// A complete point-in-time view of a workflow, not a diff.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowSnapshot {
    pub metadata: Metadata,
    pub spec: WorkflowSpec,
    pub status: WorkflowStatus,
}

/// Response shape of the engine's list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowList {
    pub items: Vec<WorkflowSnapshot>,
}

/// One message from the engine's watch stream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchMessage {
    /// Watch event kind (`ADDED`, `MODIFIED`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub object: WorkflowSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_deserializes_engine_casing() {
        let phase: Phase = serde_json::from_str("\"Succeeded\"").unwrap();
        assert_eq!(phase, Phase::Succeeded);
        assert_eq!(phase.as_str(), "succeeded");
    }

    #[test]
    fn unrecognized_phase_maps_to_unknown() {
        let phase: Phase = serde_json::from_str("\"Paused\"").unwrap();
        assert_eq!(phase, Phase::Unknown);
        let phase: Phase = serde_json::from_str("\"\"").unwrap();
        assert_eq!(phase, Phase::Unknown);
    }

    #[test]
    fn node_kind_distinguishes_stages() {
        let kind: NodeKind = serde_json::from_str("\"StepGroup\"").unwrap();
        assert_eq!(kind, NodeKind::StepGroup);
        let kind: NodeKind = serde_json::from_str("\"DAG\"").unwrap();
        assert_eq!(kind, NodeKind::DAG);
    }

    #[test]
    fn node_status_accepts_partial_payloads() {
        let node: NodeStatus = serde_json::from_str(
            r#"{"id": "wf-1", "type": "Pod", "phase": "Running", "templateName": "inject"}"#,
        )
        .unwrap();
        assert_eq!(node.id, "wf-1");
        assert_eq!(node.kind, NodeKind::Pod);
        assert_eq!(node.template_name, "inject");
        assert!(node.children.is_empty());
        assert!(node.finished_at.is_none());
    }
}
