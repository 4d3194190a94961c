use async_trait::async_trait;
use core_types::{require_str, Stratum, StratumErrorKind};
use serde_json::{json, Map, Value};

use crate::client::AccessibilityClient;
use crate::errors::AxError;

pub struct AccessibilityStratum {
    client: AccessibilityClient,
}

impl AccessibilityStratum {
    pub fn new(client: AccessibilityClient) -> Self {
        Self { client }
    }
}

fn map_error(err: AxError) -> StratumErrorKind {
    match err {
        AxError::UnknownRef(m) => StratumErrorKind::UnknownRef(m),
        AxError::PermissionDenied(m) => StratumErrorKind::PermissionDenied(m),
        AxError::AppNotFound(m) => StratumErrorKind::AppNotFound(m),
        AxError::ScriptFailed(m) => StratumErrorKind::ScriptFailed(m),
        AxError::Timeout => StratumErrorKind::Timeout("accessibility script".to_string()),
        AxError::StaleElement(idx) => {
            StratumErrorKind::UnknownRef(format!("element at flat index {idx}"))
        }
    }
}

fn menu_path_param(params: &Map<String, Value>) -> Result<Vec<String>, StratumErrorKind> {
    let raw = params.get("menuPath").and_then(Value::as_array).ok_or_else(|| {
        StratumErrorKind::Validation(
            "Missing \"menuPath\" parameter for accessibility menu_click".to_string(),
        )
    })?;
    raw.iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                StratumErrorKind::Validation("\"menuPath\" must be an array of strings".to_string())
            })
        })
        .collect()
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
impl Stratum for AccessibilityStratum {
    async fn handle(
        &self,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Map<String, Value>, StratumErrorKind> {
        let value = match action {
            "get_tree" => {
                let app = require_str(params, "app", "accessibility get_tree")?;
                let windows = self.client.get_tree(app).await.map_err(map_error)?;
                json!({ "windows": windows })
            }
            "snapshot" => {
                let app = require_str(params, "app", "accessibility snapshot")?;
                let result = self.client.snapshot(app).await.map_err(map_error)?;
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            "press_button" => {
                let reference = require_str(params, "ref", "accessibility press_button")?;
                self.client.press_button(reference).await.map_err(map_error)?
            }
            "set_value" => {
                let reference = require_str(params, "ref", "accessibility set_value")?;
                let new_value = require_str(params, "value", "accessibility set_value")?;
                self.client
                    .set_value(reference, new_value)
                    .await
                    .map_err(map_error)?
            }
            "get_value" => {
                let reference = require_str(params, "ref", "accessibility get_value")?;
                self.client.get_value(reference).await.map_err(map_error)?
            }
            "focus" => {
                let reference = require_str(params, "ref", "accessibility focus")?;
                self.client.focus(reference).await.map_err(map_error)?
            }
            "menu_click" => {
                let app = require_str(params, "app", "accessibility menu_click")?;
                let menu_path = menu_path_param(params)?;
                self.client.menu_click(app, &menu_path).await.map_err(map_error)?
            }
            "find_element" => {
                let app = require_str(params, "app", "accessibility find_element")?;
                let query = require_str(params, "query", "accessibility find_element")?;
                let result = self.client.find_element(app, query).await.map_err(map_error)?;
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            other => {
                return Err(StratumErrorKind::Validation(format!(
                    "Unknown accessibility action \"{other}\""
                )))
            }
        };

        Ok(as_data(value))
    }
}
