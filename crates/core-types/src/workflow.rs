//! Workflow definition schema (spec.md §3, §4.C12).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub description: String,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepDef {
    pub id: String,
    pub description: String,
    pub application: Option<String>,
    pub layer: String,
    pub action: String,
    #[serde(default)]
    pub params: Value,
    pub output: Option<String>,
    pub verification: Option<String>,
    pub fallback_layer: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoopDef {
    pub over: String,
    pub source: String,
    pub variable: String,
    pub steps_in_loop: Vec<StepDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuleDef {
    pub condition: String,
    pub action: String,
    pub source: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    pub steps: Vec<StepDef>,
    #[serde(rename = "loops")]
    pub loops: Option<LoopDef>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}
