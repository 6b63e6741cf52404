//! Reconstructs the stage/step hierarchy from the flat execution-node graph.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::engine::types::{NodeKind, NodeStatus, Template};
use crate::event::model::{StageEvent, StepEvent};

/// Reasons a snapshot's node graph cannot be turned into a hierarchy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("step node `{node}` references unknown template `{template}`")]
    UnknownTemplate { node: String, template: String },
    #[error("stage `{stage}` references unknown child node `{child}`")]
    UnknownNode { stage: String, child: String },
}

/// Builds the ordered stage hierarchy from the template list and node graph.
///
/// Stage nodes (kind `StepGroup`) carry zero-based positional display names
/// of the form `"[i]"`; stages are appended in ascending index order, with
/// each stage's steps in its child-list order. Iteration stops at the first
/// missing index, so sparse stage indices silently truncate the remainder.
/// The engine has not been observed to emit gaps, but that guarantee is
/// unconfirmed upstream; the truncation is kept as a known limitation.
///
/// The build is all-or-nothing: a single unresolved template or child
/// reference invalidates the whole snapshot.
pub fn build_stage_tree(
    templates: &[Template],
    nodes: &BTreeMap<String, NodeStatus>,
) -> Result<Vec<StageEvent>, TreeError> {
    // Index the graph once; lookups below never depend on map iteration.
    let arena: Vec<&NodeStatus> = nodes.values().collect();
    let mut stages_by_name: HashMap<&str, usize> = HashMap::new();
    let mut steps_by_id: HashMap<&str, usize> = HashMap::new();
    for (idx, node) in arena.iter().enumerate() {
        if node.kind == NodeKind::StepGroup {
            stages_by_name.insert(node.display_name.as_str(), idx);
        } else {
            steps_by_id.insert(node.id.as_str(), idx);
        }
    }
    let templates_by_name: HashMap<&str, &Template> =
        templates.iter().map(|t| (t.name.as_str(), t)).collect();

    let mut stages = Vec::new();
    for index in 0usize.. {
        let key = format!("[{index}]");
        let Some(&stage_idx) = stages_by_name.get(key.as_str()) else {
            break;
        };
        let stage = arena[stage_idx];

        let mut steps = Vec::with_capacity(stage.children.len());
        for child in &stage.children {
            let step = steps_by_id
                .get(child.as_str())
                .map(|&idx| arena[idx])
                .ok_or_else(|| TreeError::UnknownNode {
                    stage: key.clone(),
                    child: child.clone(),
                })?;
            let template = templates_by_name
                .get(step.template_name.as_str())
                .copied()
                .ok_or_else(|| TreeError::UnknownTemplate {
                    node: step.id.clone(),
                    template: step.template_name.clone(),
                })?;
            steps.push(StepEvent::new(template, step));
        }

        stages.push(StageEvent::new(stage, steps));
    }

    Ok(stages)
}
