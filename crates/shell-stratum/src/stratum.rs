use std::time::Duration;

use async_trait::async_trait;
use core_types::{optional_u64, require_str, StratumErrorKind};
use core_types::Stratum;
use scripting_bridge::ScriptingBridge;
use serde_json::{Map, Value};
use subprocess_runner::SubprocessRunner;

use crate::actions;

pub struct ShellStratum {
    runner: SubprocessRunner,
    bridge: ScriptingBridge,
    default_exec_timeout: Duration,
}

impl ShellStratum {
    pub fn new(bridge: ScriptingBridge, default_exec_timeout: Duration) -> Self {
        Self {
            runner: SubprocessRunner::new(),
            bridge,
            default_exec_timeout,
        }
    }
}

#[async_trait]
impl Stratum for ShellStratum {
    async fn handle(
        &self,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Map<String, Value>, StratumErrorKind> {
        let value = match action {
            "exec" => {
                let command = require_str(params, "command", "shell exec")?;
                let timeout_ms = optional_u64(params, "timeoutMs")
                    .map(Duration::from_millis)
                    .unwrap_or(self.default_exec_timeout);
                actions::exec(&self.runner, command, timeout_ms).await?
            }
            "launch_app" => {
                let app = require_str(params, "app", "shell launch_app")?;
                actions::launch_app(&self.runner, app).await?
            }
            "switch_app" => {
                let app = require_str(params, "app", "shell switch_app")?;
                actions::switch_app(&self.bridge, app).await?
            }
            "close_app" => {
                let app = require_str(params, "app", "shell close_app")?;
                actions::close_app(&self.bridge, app).await?
            }
            "minimize_window" => {
                let app = require_str(params, "app", "shell minimize_window")?;
                actions::minimize_window(&self.bridge, app).await?
            }
            "list_apps" => actions::list_apps(&self.bridge).await?,
            "get_frontmost" => actions::get_frontmost(&self.bridge).await?,
            other => {
                return Err(StratumErrorKind::Validation(format!(
                    "Unknown shell action \"{other}\""
                )))
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                Ok(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn stratum() -> ShellStratum {
        let bridge = ScriptingBridge::new(None, StdDuration::from_secs(15), 10 * 1024 * 1024);
        ShellStratum::new(bridge, StdDuration::from_secs(30))
    }

    #[tokio::test]
    async fn exec_reports_missing_command_param_per_spec_s1() {
        let stratum = stratum();
        let params = Map::new();
        let err = stratum.handle("exec", &params).await.unwrap_err();
        assert_eq!(
            err.message(),
            "Missing \"command\" parameter for shell exec"
        );
    }

    #[tokio::test]
    async fn exec_runs_and_returns_stdout() {
        let stratum = stratum();
        let mut params = Map::new();
        params.insert("command".to_string(), Value::String("echo hi".to_string()));
        let data = stratum.handle("exec", &params).await.unwrap();
        assert_eq!(data.get("stdout").and_then(Value::as_str).unwrap().trim(), "hi");
        assert_eq!(data.get("exitCode").and_then(Value::as_i64), Some(0));
    }

    #[tokio::test]
    async fn unknown_action_is_a_validation_error() {
        let stratum = stratum();
        let err = stratum.handle("teleport", &Map::new()).await.unwrap_err();
        assert!(matches!(err, StratumErrorKind::Validation(_)));
    }
}
