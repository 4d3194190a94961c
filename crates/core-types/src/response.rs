//! Tagged outcome parsed from the oracle's reply (C9 output, spec.md §3/§4.C9).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::Command;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ParsedResponse {
    Action {
        thinking: String,
        command: Command,
    },
    Complete {
        thinking: String,
        summary: String,
    },
    NeedsHelp {
        thinking: String,
        question: String,
    },
    Error {
        error: String,
        raw_response: String,
    },
}

impl ParsedResponse {
    pub fn error(reason: impl Into<String>, raw_response: impl Into<String>) -> Self {
        ParsedResponse::Error {
            error: reason.into(),
            raw_response: raw_response.into(),
        }
    }
}

/// The oracle's raw reply grammar, before it has been validated into a
/// [`ParsedResponse`]. Mirrors the three shapes in spec.md §6.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum OracleReply {
    Action {
        thinking: String,
        action: OracleAction,
    },
    Status {
        thinking: String,
        status: String,
        summary: Option<String>,
        question: Option<String>,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct OracleAction {
    pub layer: String,
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}
