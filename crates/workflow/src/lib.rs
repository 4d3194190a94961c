#![allow(dead_code)]

pub mod errors;
pub mod render;
pub mod resolve;

pub use core_types::{LoopDef, RuleDef, StepDef, VariableDef, WorkflowDefinition};
pub use errors::WorkflowError;
pub use render::format_workflow_as_goal;
pub use resolve::resolve_variables;
