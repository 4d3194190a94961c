use async_trait::async_trait;
use core_types::{optional_bool, optional_str, require_str, Stratum, StratumErrorKind};
use serde_json::{json, Map, Value};

use crate::client::BrowserClient;
use crate::errors::BrowserError;

pub struct BrowserStratum {
    client: BrowserClient,
}

impl BrowserStratum {
    pub fn new(client: BrowserClient) -> Self {
        Self { client }
    }
}

fn map_error(err: BrowserError) -> StratumErrorKind {
    match err {
        BrowserError::NavTimeout(m) => StratumErrorKind::Timeout(m),
        BrowserError::UnknownRef(m) => StratumErrorKind::UnknownRef(m),
        BrowserError::StaleRoute(m) => StratumErrorKind::StaleSnapshot(m),
        BrowserError::OptionNotFound(m) => StratumErrorKind::Validation(format!(
            "Option not found in dropdown: {m}"
        )),
        BrowserError::NotLaunched => {
            StratumErrorKind::Validation("browser has not been launched".to_string())
        }
        BrowserError::CdpIo(m) => StratumErrorKind::Internal(m),
    }
}

#[async_trait]
impl Stratum for BrowserStratum {
    async fn handle(
        &self,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Map<String, Value>, StratumErrorKind> {
        let value = match action {
            "launch" => {
                self.client.launch().await.map_err(map_error)?;
                json!({ "launched": true })
            }
            "close" => {
                self.client.close().await.map_err(map_error)?;
                json!({ "closed": true })
            }
            "navigate" => {
                let url = require_str(params, "url", "browser navigate")?;
                let result = self.client.navigate(url).await.map_err(map_error)?;
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            "snapshot" => {
                let interactive = optional_bool(params, "interactive").unwrap_or(false);
                let result = self.client.snapshot(interactive).await.map_err(map_error)?;
                serde_json::to_value(result).unwrap_or(Value::Null)
            }
            "click" => {
                let reference = require_str(params, "ref", "browser click")?;
                self.client.click(reference).await.map_err(map_error)?;
                json!({ "action": "click", "ref": reference })
            }
            "type" => {
                let reference = require_str(params, "ref", "browser type")?;
                let text = require_str(params, "text", "browser type")?;
                self.client.type_text(reference, text).await.map_err(map_error)?;
                json!({ "action": "type", "ref": reference })
            }
            "select" => {
                let reference = require_str(params, "ref", "browser select")?;
                let value = require_str(params, "value", "browser select")?;
                self.client.select(reference, value).await.map_err(map_error)?;
                json!({ "action": "select", "ref": reference, "value": value })
            }
            "screenshot" => {
                let base64 = self.client.screenshot().await.map_err(map_error)?;
                json!({ "screenshot_base64": base64 })
            }
            "page_info" => {
                let info = self.client.page_info().await.map_err(map_error)?;
                serde_json::to_value(info).unwrap_or(Value::Null)
            }
            "new_tab" => {
                let url = optional_str(params, "url");
                let tab = self.client.new_tab(url).await.map_err(map_error)?;
                serde_json::to_value(tab).unwrap_or(Value::Null)
            }
            "close_tab" => {
                self.client.close_tab().await.map_err(map_error)?;
                json!({ "closed": true })
            }
            "list_tabs" => {
                let tabs = self.client.list_tabs().await.map_err(map_error)?;
                json!({ "tabs": tabs })
            }
            other => {
                return Err(StratumErrorKind::Validation(format!(
                    "Unknown browser action \"{other}\""
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
