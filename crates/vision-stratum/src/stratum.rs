use async_trait::async_trait;
use core_types::{optional_bool, optional_str, require_str, Stratum, StratumErrorKind};
use serde_json::{json, Map, Value};

use crate::client::VisionClient;
use crate::errors::VisionError;
use crate::model::{ImagePoint, TaskContext};

pub struct VisionStratum {
    client: VisionClient,
}

impl VisionStratum {
    pub fn new(client: VisionClient) -> Self {
        Self { client }
    }
}

fn map_error(err: VisionError) -> StratumErrorKind {
    match err {
        VisionError::CaptureFailed(m) => StratumErrorKind::Internal(m),
        VisionError::Timeout => StratumErrorKind::Timeout("vision capture".to_string()),
        VisionError::AppNotFound(m) => StratumErrorKind::AppNotFound(m),
        VisionError::PermissionDenied(m) => StratumErrorKind::PermissionDenied(m),
        VisionError::InvalidKeyCombo(combo, reason) => {
            StratumErrorKind::Validation(format!("invalid key combo \"{combo}\": {reason}"))
        }
        VisionError::ScriptFailed(m) => StratumErrorKind::ScriptFailed(m),
        VisionError::Io(m) => StratumErrorKind::Internal(m),
    }
}

fn require_f64(params: &Map<String, Value>, key: &str, action: &str) -> Result<f64, StratumErrorKind> {
    params.get(key).and_then(Value::as_f64).ok_or_else(|| {
        StratumErrorKind::Validation(format!("Missing \"{key}\" parameter for {action}"))
    })
}

fn as_data(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    }
}

#[async_trait]
impl Stratum for VisionStratum {
    async fn handle(
        &self,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Map<String, Value>, StratumErrorKind> {
        let value = match action {
            "screenshot" => {
                let mode = optional_str(params, "mode").unwrap_or("fullscreen");
                let app = optional_str(params, "app");
                let result = match (mode, app) {
                    ("window", Some(app)) => self.client.screenshot_window(app).await,
                    ("window", None) => self.client.screenshot_fullscreen().await,
                    ("region", _) => self.client.screenshot_fullscreen().await,
                    _ => self.client.screenshot_fullscreen().await,
                }
                .map_err(map_error)?;
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            "context_collection" => {
                let app = optional_str(params, "app");
                let task_context = if params.contains_key("currentStep")
                    || params.contains_key("expectedOutcome")
                    || params.contains_key("workflowName")
                {
                    Some(TaskContext {
                        current_step: optional_str(params, "currentStep").map(str::to_string),
                        expected_outcome: optional_str(params, "expectedOutcome").map(str::to_string),
                        workflow_name: optional_str(params, "workflowName").map(str::to_string),
                    })
                } else {
                    None
                };
                let result = self
                    .client
                    .context_collection(app, task_context)
                    .await
                    .map_err(map_error)?;
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            "click_coordinates" => {
                let x = require_f64(params, "x", "vision click_coordinates")?;
                let y = require_f64(params, "y", "vision click_coordinates")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let (host_x, host_y, verification) = self
                    .client
                    .click_coordinates(ImagePoint { x, y }, verify)
                    .await
                    .map_err(map_error)?;
                json!({ "action": "click_coordinates", "hostX": host_x, "hostY": host_y, "verification": verification })
            }
            "double_click" => {
                let x = require_f64(params, "x", "vision double_click")?;
                let y = require_f64(params, "y", "vision double_click")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let (host_x, host_y, verification) = self
                    .client
                    .double_click(ImagePoint { x, y }, verify)
                    .await
                    .map_err(map_error)?;
                json!({ "action": "double_click", "hostX": host_x, "hostY": host_y, "verification": verification })
            }
            "right_click" => {
                let x = require_f64(params, "x", "vision right_click")?;
                let y = require_f64(params, "y", "vision right_click")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let (host_x, host_y, verification) = self
                    .client
                    .right_click(ImagePoint { x, y }, verify)
                    .await
                    .map_err(map_error)?;
                json!({ "action": "right_click", "hostX": host_x, "hostY": host_y, "verification": verification })
            }
            "drag" => {
                let from_x = require_f64(params, "fromX", "vision drag")?;
                let from_y = require_f64(params, "fromY", "vision drag")?;
                let to_x = require_f64(params, "toX", "vision drag")?;
                let to_y = require_f64(params, "toY", "vision drag")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let verification = self
                    .client
                    .drag(ImagePoint { x: from_x, y: from_y }, ImagePoint { x: to_x, y: to_y }, verify)
                    .await
                    .map_err(map_error)?;
                json!({ "action": "drag", "verification": verification })
            }
            "scroll" => {
                let x = require_f64(params, "x", "vision scroll")?;
                let y = require_f64(params, "y", "vision scroll")?;
                let delta_y = require_f64(params, "deltaY", "vision scroll")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let verification = self
                    .client
                    .scroll(ImagePoint { x, y }, delta_y, verify)
                    .await
                    .map_err(map_error)?;
                json!({ "action": "scroll", "verification": verification })
            }
            "type_text" => {
                let text = require_str(params, "text", "vision type_text")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let verification = self.client.type_text(text, verify).await.map_err(map_error)?;
                json!({ "action": "type_text", "verification": verification })
            }
            "key_combo" => {
                let combo = require_str(params, "combo", "vision key_combo")?;
                let verify = optional_bool(params, "verify").unwrap_or(false);
                let verification = self.client.key_combo(combo, verify).await.map_err(map_error)?;
                json!({ "action": "key_combo", "verification": verification })
            }
            other => {
                return Err(StratumErrorKind::Validation(format!(
                    "Unknown vision action \"{other}\""
                )))
            }
        };

        Ok(as_data(value))
    }
}
