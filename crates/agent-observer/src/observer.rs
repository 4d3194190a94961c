use std::sync::atomic::{AtomicU64, Ordering};

use core_types::{
    AvailableLayer, Command, ElementRecord, Layer, Observation, PageMetadata,
};
use dispatcher::Dispatcher;
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::ObserverError;
use crate::model::{last_five, ObserveInputs};

static STEP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Composes an [`Observation`] out of self-commands dispatched through the
/// same [`Dispatcher`] the controller uses (spec.md §4.C8). Every step past
/// the screenshot is independently guarded: a failure degrades the
/// observation rather than failing it outright.
pub struct Observer;

impl Observer {
    pub async fn observe(
        dispatcher: &Dispatcher,
        inputs: ObserveInputs,
    ) -> Result<Observation, ObserverError> {
        let step = STEP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let (screenshot_base64, screenshot_width, screenshot_height) =
            Self::take_screenshot(dispatcher, step).await?;

        let (frontmost_app, window_title, menu_bar_items) =
            Self::collect_context(dispatcher, step).await;

        let (browser_elements, browser_page, desktop_elements) = if inputs.browser_active {
            let elements_and_page = Self::browser_elements(dispatcher, step).await;
            (elements_and_page.0, elements_and_page.1, Vec::new())
        } else {
            let desktop = Self::accessibility_elements(dispatcher, step, frontmost_app.as_deref()).await;
            (Vec::new(), None, desktop)
        };

        let available_layer = if !browser_elements.is_empty() {
            AvailableLayer::Browser
        } else if !desktop_elements.is_empty() {
            AvailableLayer::Accessibility
        } else {
            AvailableLayer::VisionOnly
        };

        Ok(Observation {
            screenshot_base64,
            screenshot_width,
            screenshot_height,
            frontmost_app,
            window_title,
            menu_bar_items,
            recent_actions: last_five(inputs.recent_actions),
            browser_elements,
            browser_page: if matches!(available_layer, AvailableLayer::Browser) {
                browser_page
            } else {
                None
            },
            desktop_elements,
            available_layer,
        })
    }

    async fn take_screenshot(
        dispatcher: &Dispatcher,
        step: u64,
    ) -> Result<(String, u32, u32), ObserverError> {
        let cmd = Command::new(format!("obs-{step}-screenshot"), Layer::Vision, "screenshot", Map::new());
        let result = dispatcher.dispatch(cmd).await;
        if !result.is_success() {
            let message = result
                .data
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ObserverError::ScreenshotFailed(message));
        }
        let base64 = result
            .data
            .get("screenshot_base64")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let width = result.data.get("width").and_then(Value::as_u64).unwrap_or(0) as u32;
        let height = result.data.get("height").and_then(Value::as_u64).unwrap_or(0) as u32;
        Ok((base64, width, height))
    }

    async fn collect_context(
        dispatcher: &Dispatcher,
        step: u64,
    ) -> (Option<String>, Option<String>, Vec<String>) {
        let cmd = Command::new(
            format!("obs-{step}-context"),
            Layer::Vision,
            "context_collection",
            Map::new(),
        );
        let result = dispatcher.dispatch(cmd).await;
        if !result.is_success() {
            warn!(step, error = ?result.data.get("error"), "observer: context collection degraded");
            return (None, None, Vec::new());
        }

        let frontmost_app = result
            .data
            .get("frontmost_app")
            .and_then(Value::as_str)
            .map(str::to_string);
        let window_title = result
            .data
            .get("window_title")
            .and_then(Value::as_str)
            .map(str::to_string);
        let menu_bar_items = result
            .data
            .get("accessibility")
            .and_then(|v| v.get("menu_bar_items"))
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        (frontmost_app, window_title, menu_bar_items)
    }

    async fn browser_elements(
        dispatcher: &Dispatcher,
        step: u64,
    ) -> (Vec<ElementRecord>, Option<PageMetadata>) {
        let mut params = Map::new();
        params.insert("interactive".to_string(), Value::Bool(true));
        let snapshot_cmd = Command::new(format!("obs-{step}-browser-snapshot"), Layer::Browser, "snapshot", params);
        let snapshot_result = dispatcher.dispatch(snapshot_cmd).await;
        if !snapshot_result.is_success() {
            warn!(step, error = ?snapshot_result.data.get("error"), "observer: browser snapshot degraded");
            return (Vec::new(), None);
        }

        let elements = snapshot_result
            .data
            .get("elements")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(element_from_browser_json).collect())
            .unwrap_or_default();

        let page_cmd = Command::new(format!("obs-{step}-page-info"), Layer::Browser, "page_info", Map::new());
        let page_result = dispatcher.dispatch(page_cmd).await;
        let page = if page_result.is_success() {
            let url = page_result.data.get("url").and_then(Value::as_str).map(str::to_string);
            let title = page_result.data.get("title").and_then(Value::as_str).map(str::to_string);
            url.map(|url| PageMetadata { url, title })
        } else {
            snapshot_result
                .data
                .get("page_url")
                .and_then(Value::as_str)
                .map(|url| PageMetadata {
                    url: url.to_string(),
                    title: snapshot_result
                        .data
                        .get("page_title")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
        };

        (elements, page)
    }

    async fn accessibility_elements(
        dispatcher: &Dispatcher,
        step: u64,
        frontmost_app: Option<&str>,
    ) -> Vec<ElementRecord> {
        let Some(app) = frontmost_app else {
            return Vec::new();
        };

        let mut params = Map::new();
        params.insert("app".to_string(), Value::String(app.to_string()));
        let cmd = Command::new(format!("obs-{step}-ax-snapshot"), Layer::Accessibility, "snapshot", params);
        let result = dispatcher.dispatch(cmd).await;
        if !result.is_success() {
            warn!(step, error = ?result.data.get("error"), "observer: accessibility snapshot degraded");
            return Vec::new();
        }

        result
            .data
            .get("elements")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(element_from_ax_json).collect())
            .unwrap_or_default()
    }
}

fn element_from_browser_json(value: &Value) -> Option<ElementRecord> {
    Some(ElementRecord {
        reference: value.get("ref")?.as_str()?.to_string(),
        role: value.get("role")?.as_str().unwrap_or("unknown").to_string(),
        label: value.get("label").and_then(Value::as_str).map(str::to_string),
        value: None,
        enabled: true,
    })
}

fn element_from_ax_json(value: &Value) -> Option<ElementRecord> {
    Some(ElementRecord {
        reference: value.get("ref")?.as_str()?.to_string(),
        role: value.get("role")?.as_str().unwrap_or("unknown").to_string(),
        label: value.get("label").and_then(Value::as_str).map(str::to_string),
        value: value.get("value").and_then(Value::as_str).map(str::to_string),
        enabled: value.get("enabled").and_then(Value::as_bool).unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::{Stratum, StratumErrorKind};
    use serde_json::json;

    struct StubStratum {
        response: fn(&str) -> Result<Map<String, Value>, StratumErrorKind>,
    }

    #[async_trait]
    impl Stratum for StubStratum {
        async fn handle(&self, action: &str, _params: &Map<String, Value>) -> Result<Map<String, Value>, StratumErrorKind> {
            (self.response)(action)
        }
    }

    fn dispatcher_with(
        shell: fn(&str) -> Result<Map<String, Value>, StratumErrorKind>,
        browser: fn(&str) -> Result<Map<String, Value>, StratumErrorKind>,
        accessibility: fn(&str) -> Result<Map<String, Value>, StratumErrorKind>,
        vision: fn(&str) -> Result<Map<String, Value>, StratumErrorKind>,
    ) -> Dispatcher {
        Dispatcher::new(
            Box::new(StubStratum { response: shell }),
            Box::new(StubStratum { response: browser }),
            Box::new(StubStratum { response: accessibility }),
            Box::new(StubStratum { response: vision }),
        )
    }

    fn ok(value: Value) -> Result<Map<String, Value>, StratumErrorKind> {
        Ok(value.as_object().unwrap().clone())
    }

    #[tokio::test]
    async fn screenshot_failure_is_terminal_for_the_observation() {
        let dispatcher = dispatcher_with(
            |_| ok(json!({})),
            |_| ok(json!({})),
            |_| ok(json!({})),
            |_| Err(StratumErrorKind::Internal("capture failed".into())),
        );
        let err = Observer::observe(&dispatcher, ObserveInputs::default()).await.unwrap_err();
        assert!(matches!(err, ObserverError::ScreenshotFailed(_)));
    }

    #[tokio::test]
    async fn context_failure_degrades_rather_than_fails() {
        let dispatcher = dispatcher_with(
            |_| ok(json!({})),
            |_| ok(json!({ "elements": [] })),
            |_| ok(json!({ "elements": [] })),
            |action| {
                if action == "screenshot" {
                    ok(json!({ "screenshot_base64": "Zm9v", "width": 100, "height": 50 }))
                } else {
                    Err(StratumErrorKind::Internal("context failed".into()))
                }
            },
        );
        let obs = Observer::observe(&dispatcher, ObserveInputs::default()).await.unwrap();
        assert_eq!(obs.frontmost_app, None);
        assert!(matches!(obs.available_layer, AvailableLayer::VisionOnly));
    }

    #[tokio::test]
    async fn browser_active_yields_nonempty_elements_and_browser_layer() {
        let dispatcher = dispatcher_with(
            |_| ok(json!({})),
            |action| match action {
                "snapshot" => ok(json!({
                    "page_url": "https://example.com",
                    "page_title": "Example",
                    "elements": [{"ref": "e1", "role": "button", "label": "Go"}],
                })),
                "page_info" => ok(json!({ "url": "https://example.com", "title": "Example" })),
                other => panic!("unexpected browser action {other}"),
            },
            |_| ok(json!({ "elements": [] })),
            |action| {
                if action == "screenshot" {
                    ok(json!({ "screenshot_base64": "Zm9v", "width": 100, "height": 50 }))
                } else {
                    ok(json!({ "frontmost_app": "Safari", "window_title": "Example" }))
                }
            },
        );
        let inputs = ObserveInputs { browser_active: true, recent_actions: vec![] };
        let obs = Observer::observe(&dispatcher, inputs).await.unwrap();
        assert!(matches!(obs.available_layer, AvailableLayer::Browser));
        assert_eq!(obs.browser_elements.len(), 1);
        assert_eq!(obs.browser_page.unwrap().url, "https://example.com");
    }

    #[tokio::test]
    async fn accessibility_path_used_when_browser_not_active() {
        let dispatcher = dispatcher_with(
            |_| ok(json!({})),
            |_| ok(json!({ "elements": [] })),
            |action| match action {
                "snapshot" => ok(json!({
                    "app_name": "Finder",
                    "elements": [{"ref": "ax_1", "role": "button", "label": "OK", "enabled": true}],
                })),
                other => panic!("unexpected accessibility action {other}"),
            },
            |action| {
                if action == "screenshot" {
                    ok(json!({ "screenshot_base64": "Zm9v", "width": 100, "height": 50 }))
                } else {
                    ok(json!({ "frontmost_app": "Finder", "window_title": "Desktop" }))
                }
            },
        );
        let obs = Observer::observe(&dispatcher, ObserveInputs::default()).await.unwrap();
        assert!(matches!(obs.available_layer, AvailableLayer::Accessibility));
        assert_eq!(obs.desktop_elements.len(), 1);
    }
}
