//! Domain event model delivered to subscribers.
//!
//! Every received snapshot yields a fresh, immutable event value; nothing
//! here is mutated after construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::types::{NodeStatus, Template, WatchMessage, WorkflowSnapshot};
use crate::event::tree::{build_stage_tree, TreeError};

/// A leaf execution unit within a stage, bound to a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub annotations: BTreeMap<String, String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepEvent {
    pub(crate) fn new(template: &Template, node: &NodeStatus) -> Self {
        Self {
            name: node.template_name.clone(),
            kind: node.kind.as_str().to_string(),
            status: node.phase.as_str().to_string(),
            labels: template.metadata.labels.clone(),
            annotations: template.metadata.annotations.clone(),
            started_at: node.started_at.unwrap_or_default(),
            finished_at: finished(node.finished_at),
        }
    }
}

/// A step group executed together, with steps in child-list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub status: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepEvent>,
}

impl StageEvent {
    pub(crate) fn new(node: &NodeStatus, steps: Vec<StepEvent>) -> Self {
        Self {
            status: node.phase.as_str().to_string(),
            started_at: node.started_at.unwrap_or_default(),
            finished_at: finished(node.finished_at),
            steps,
        }
    }
}

/// A workflow update message, the unit the relay hands to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEvent {
    pub name: String,
    pub namespace: String,
    /// Watch event kind; absent for one-shot queries.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    pub status: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub stages: Vec<StageEvent>,
}

impl WorkflowEvent {
    /// Converts a one-shot snapshot; the event-kind tag stays absent.
    pub fn from_snapshot(snapshot: &WorkflowSnapshot) -> Result<Self, TreeError> {
        Self::convert(snapshot, None)
    }

    /// Converts a live-watch message, tagging the event with the engine's
    /// watch event kind.
    pub fn from_watch_message(message: &WatchMessage) -> Result<Self, TreeError> {
        let kind = Some(message.kind.clone()).filter(|k| !k.is_empty());
        Self::convert(&message.object, kind)
    }

    fn convert(snapshot: &WorkflowSnapshot, kind: Option<String>) -> Result<Self, TreeError> {
        let stages = build_stage_tree(&snapshot.spec.templates, &snapshot.status.nodes)?;

        Ok(Self {
            name: snapshot.metadata.name.clone(),
            namespace: snapshot.metadata.namespace.clone(),
            kind,
            status: snapshot.status.phase.as_str().to_string(),
            started_at: snapshot.status.started_at.unwrap_or_default(),
            finished_at: finished(snapshot.status.finished_at),
            stages,
        })
    }

    /// Whether no further updates can follow this event. Anything outside
    /// running/pending is a final state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.status.as_str(), "running" | "pending")
    }
}

/// Engines report either `null` or the zero timestamp while work is still
/// running; both mean "not finished yet", never "finished at epoch".
fn finished(at: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    at.filter(|t| t.timestamp() != 0)
}
