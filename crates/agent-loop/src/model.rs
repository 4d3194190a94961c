use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Loop configuration (spec.md §4.C10). `max_iterations`, `settle_delay`,
/// and `parse_error_budget` default to the spec.md §4.C10 literal values.
#[derive(Clone, Debug)]
pub struct LoopConfig {
    pub goal: String,
    pub max_iterations: u32,
    pub settle_delay: Duration,
    pub parse_error_budget: u32,
}

impl LoopConfig {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            max_iterations: 25,
            settle_delay: Duration::from_millis(800),
            parse_error_budget: 3,
        }
    }
}

/// Termination outcome of a loop run (spec.md §4.C10 state machine sketch).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Complete,
    NeedsHelp,
    MaxIterations,
    Error,
}

/// `{outcome, summary, steps}` (spec.md §7 "the final result includes...").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoopResult {
    pub outcome: Outcome,
    pub summary: String,
    pub steps: u32,
}

/// Observed at each step, for callers that want progress feedback beyond
/// the terminal [`LoopResult`] (spec.md §4.C10 "optional callbacks").
pub enum StepEvent<'a> {
    Observed(&'a core_types::Observation),
    Decided(&'a core_types::ParsedResponse),
    Acted(&'a core_types::ResultEnvelope),
}

pub trait LoopCallbacks: Send + Sync {
    fn on_event(&self, step: u32, event: StepEvent<'_>);
}
