//! Command/result envelopes exchanged between the controller and the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The execution stratum a command is routed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Shell,
    Browser,
    Accessibility,
    Vision,
    System,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Shell => "shell",
            Layer::Browser => "browser",
            Layer::Accessibility => "accessibility",
            Layer::Vision => "vision",
            Layer::System => "system",
        }
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shell" => Ok(Layer::Shell),
            "browser" | "cdp" => Ok(Layer::Browser),
            "accessibility" | "ax" => Ok(Layer::Accessibility),
            "vision" => Ok(Layer::Vision),
            "system" => Ok(Layer::System),
            other => Err(format!("unknown layer \"{other}\"")),
        }
    }
}

/// Inbound command envelope: `{type:"command", id, layer, action, params}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub id: String,
    pub layer: String,
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Command,
}

impl Command {
    pub fn new(
        id: impl Into<String>,
        layer: Layer,
        action: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        Self {
            kind: CommandKind::Command,
            id: id.into(),
            layer: layer.as_str().to_string(),
            action: action.into(),
            params,
        }
    }

    pub fn layer(&self) -> Result<Layer, String> {
        self.layer.parse()
    }
}

/// Status of a completed dispatch, never absent from a [`ResultEnvelope`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Outbound result envelope: `{type:"result", id, status, data}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub id: String,
    pub status: Status,
    pub data: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Result,
}

impl ResultEnvelope {
    pub fn success(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind: ResultKind::Result,
            id: id.into(),
            status: Status::Success,
            data,
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("error".to_string(), Value::String(message.into()));
        Self {
            kind: ResultKind::Result,
            id: id.into(),
            status: Status::Error,
            data,
        }
    }

    /// For transport-level failures that never reached a parsed command id.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::error("unknown", message)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success)
    }
}

/// Optional registration hello sent once by the agent over the transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hello {
    #[serde(rename = "type")]
    pub kind: HelloKind,
    pub agent_name: String,
    pub version: String,
    pub platform: String,
    pub supported_layers: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelloKind {
    Hello,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_envelope_id_matches_command_id() {
        let cmd = Command::new("a1", Layer::Shell, "exec", Map::new());
        let res = ResultEnvelope::success(cmd.id.clone(), Map::new());
        assert_eq!(cmd.id, res.id);
        assert!(res.is_success());
    }

    #[test]
    fn layer_round_trips_through_str() {
        for layer in [
            Layer::Shell,
            Layer::Browser,
            Layer::Accessibility,
            Layer::Vision,
            Layer::System,
        ] {
            let parsed: Layer = layer.as_str().parse().unwrap();
            assert_eq!(parsed, layer);
        }
        assert!("bogus".parse::<Layer>().is_err());
    }
}
