use std::time::Instant;

use core_types::{Command, Layer, ResultEnvelope, Stratum, StratumErrorKind};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::metrics;
use crate::process_name;

/// Routes a [`Command`] to the owning stratum and always returns a
/// [`ResultEnvelope`] — never raises (spec.md §4.C7). This is the single
/// seam every untyped fault is wrapped at.
pub struct Dispatcher {
    shell: Box<dyn Stratum>,
    browser: Box<dyn Stratum>,
    accessibility: Box<dyn Stratum>,
    vision: Box<dyn Stratum>,
}

impl Dispatcher {
    pub fn new(
        shell: Box<dyn Stratum>,
        browser: Box<dyn Stratum>,
        accessibility: Box<dyn Stratum>,
        vision: Box<dyn Stratum>,
    ) -> Self {
        Self {
            shell,
            browser,
            accessibility,
            vision,
        }
    }

    /// Dispatch `command`, returning a result envelope whose `id` always
    /// equals `command.id` (spec.md §3 invariant 1, §8 property 1).
    pub async fn dispatch(&self, command: Command) -> ResultEnvelope {
        let started = Instant::now();
        let layer = match command.layer() {
            Ok(layer) => layer,
            Err(reason) => {
                warn!(id = %command.id, layer = %command.layer, "dispatcher: unknown layer");
                metrics::observe(&command.layer, &command.action, "error", started.elapsed().as_secs_f64());
                return ResultEnvelope::error(command.id, reason);
            }
        };

        info!(id = %command.id, layer = layer.as_str(), action = %command.action, "dispatcher: dispatching");

        let outcome = self.route(layer, &command.action, &command.params).await;
        let status = if outcome.is_ok() { "success" } else { "error" };
        metrics::observe(layer.as_str(), &command.action, status, started.elapsed().as_secs_f64());

        match outcome {
            Ok(data) => ResultEnvelope::success(command.id, data),
            Err(err) => {
                warn!(id = %command.id, error = %err, "dispatcher: command failed");
                ResultEnvelope::error(command.id, err.message())
            }
        }
    }

    async fn route(
        &self,
        layer: Layer,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Map<String, Value>, StratumErrorKind> {
        match layer {
            Layer::Shell => self.shell.handle(action, params).await,
            Layer::Browser => self.browser.handle(action, params).await,
            Layer::Accessibility => self.accessibility.handle(action, params).await,
            Layer::Vision => self.vision.handle(action, params).await,
            Layer::System => self.handle_system(action, params).await,
        }
    }

    async fn handle_system(
        &self,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Map<String, Value>, StratumErrorKind> {
        match action {
            "ping" => {
                let mut data = Map::new();
                data.insert("pong".to_string(), Value::Bool(true));
                Ok(data)
            }
            "resolve_process_name" => {
                let requested = core_types::require_str(params, "app", "system resolve_process_name")?;
                let apps_data = self.shell.handle("list_apps", &Map::new()).await?;
                let known: Vec<String> = apps_data
                    .get("apps")
                    .and_then(Value::as_array)
                    .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                let resolved = process_name::resolve(requested, &known);
                match resolved {
                    Some(name) => {
                        let mut data = Map::new();
                        data.insert("app".to_string(), Value::String(requested.to_string()));
                        data.insert("processName".to_string(), Value::String(name.to_string()));
                        Ok(data)
                    }
                    None => Err(StratumErrorKind::AppNotFound(requested.to_string())),
                }
            }
            other => Err(StratumErrorKind::Validation(format!(
                "Unknown system action \"{other}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubStratum {
        fail: bool,
    }

    #[async_trait]
    impl Stratum for StubStratum {
        async fn handle(
            &self,
            action: &str,
            _params: &Map<String, Value>,
        ) -> Result<Map<String, Value>, StratumErrorKind> {
            if self.fail {
                return Err(StratumErrorKind::Validation(format!("bad action {action}")));
            }
            Ok(json!({ "action": action }).as_object().unwrap().clone())
        }
    }

    fn dispatcher(fail: bool) -> Dispatcher {
        Dispatcher::new(
            Box::new(StubStratum { fail }),
            Box::new(StubStratum { fail }),
            Box::new(StubStratum { fail }),
            Box::new(StubStratum { fail }),
        )
    }

    #[tokio::test]
    async fn result_id_always_matches_command_id_per_spec_property_1() {
        let dispatcher = dispatcher(false);
        let command = Command::new("a1", Layer::Shell, "exec", Map::new());
        let result = dispatcher.dispatch(command).await;
        assert_eq!(result.id, "a1");
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn unknown_layer_is_an_error_result_not_a_panic() {
        let dispatcher = dispatcher(false);
        let mut command = Command::new("a1", Layer::Shell, "exec", Map::new());
        command.layer = "teleport".to_string();
        let result = dispatcher.dispatch(command).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn system_ping_always_succeeds() {
        let dispatcher = dispatcher(true);
        let command = Command::new("a1", Layer::System, "ping", Map::new());
        let result = dispatcher.dispatch(command).await;
        assert!(result.is_success());
        assert_eq!(result.data.get("pong"), Some(&Value::Bool(true)));
    }

    #[tokio::test]
    async fn stratum_failure_becomes_error_result_not_a_raise() {
        let dispatcher = dispatcher(true);
        let command = Command::new("a1", Layer::Shell, "exec", Map::new());
        let result = dispatcher.dispatch(command).await;
        assert!(!result.is_success());
        assert_eq!(result.id, "a1");
    }
}
