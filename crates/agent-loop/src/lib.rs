#![allow(dead_code)]

pub mod agent_loop;
pub mod anthropic;
pub mod errors;
pub mod feedback;
pub mod model;
pub mod oracle;

pub use agent_loop::AgentLoop;
pub use anthropic::{AnthropicConfig, AnthropicOracle};
pub use errors::OracleError;
pub use model::{LoopCallbacks, LoopConfig, LoopResult, Outcome, StepEvent};
pub use oracle::Oracle;
