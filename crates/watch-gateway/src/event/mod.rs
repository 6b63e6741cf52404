//! Domain events and the adapter interfaces that move them.

pub mod model;
pub mod reader;
pub mod tree;
pub mod writer;

pub use model::{StageEvent, StepEvent, WorkflowEvent};
pub use reader::{EventReader, ReadError, ReadOutcome};
pub use tree::{build_stage_tree, TreeError};
pub use writer::{EventWriter, WriteError};
