use core_types::{RefLookup, RefTable};
use scripting_bridge::{BridgeError, ScriptingBridge};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AxError;
use crate::jxa;
use crate::model::{AxElement, AxLocator, AxSnapshot, TreeNode, INTERACTIVE_ROLES};

/// Accessibility stratum state: a process-wide single current snapshot, per
/// spec.md §5 "Shared resources". `get_tree()` is read-only and never
/// touches this ref table (spec.md §4.C5 point 1).
pub struct AccessibilityClient {
    bridge: ScriptingBridge,
    refs: tokio::sync::Mutex<RefTable<AxLocator>>,
    tree_max_depth: usize,
    tree_max_children: usize,
    snapshot_max_elements: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshotElement {
    window_index: usize,
    flat_index: usize,
    role: String,
    label: Option<String>,
    value: Option<String>,
    #[serde(default)]
    enabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    app_name: String,
    elements: Vec<RawSnapshotElement>,
}

impl AccessibilityClient {
    pub fn new(
        bridge: ScriptingBridge,
        tree_max_depth: usize,
        tree_max_children: usize,
        snapshot_max_elements: usize,
    ) -> Self {
        Self {
            bridge,
            refs: tokio::sync::Mutex::new(RefTable::new()),
            tree_max_depth,
            tree_max_children,
            snapshot_max_elements,
        }
    }

    pub async fn get_tree(&self, app_name: &str) -> Result<Vec<TreeNode>, AxError> {
        info!(app = app_name, "accessibility: get_tree");
        let script = jxa::get_tree(app_name, self.tree_max_depth, self.tree_max_children);
        let value = self.bridge.run_json(&script).await.map_err(map_bridge_error)?;
        #[derive(Deserialize)]
        struct Wrapper {
            windows: Vec<TreeNode>,
        }
        let wrapper: Wrapper =
            serde_json::from_value(value).map_err(|e| AxError::ScriptFailed(e.to_string()))?;
        Ok(wrapper.windows)
    }

    pub async fn snapshot(&self, app_name: &str) -> Result<AxSnapshot, AxError> {
        info!(app = app_name, "accessibility: snapshot");
        let script = jxa::snapshot(app_name, INTERACTIVE_ROLES, self.snapshot_max_elements);
        let value = self.bridge.run_json(&script).await.map_err(map_bridge_error)?;
        self.rewrite_from_raw(value).await
    }

    async fn rewrite_from_raw(&self, value: Value) -> Result<AxSnapshot, AxError> {
        let raw: RawSnapshot =
            serde_json::from_value(value).map_err(|e| AxError::ScriptFailed(e.to_string()))?;

        let mut refs_guard = self.refs.lock().await;
        let locators: Vec<AxLocator> = raw
            .elements
            .iter()
            .map(|el| AxLocator {
                app_name: raw.app_name.clone(),
                window_index: el.window_index,
                flat_index: el.flat_index,
            })
            .collect();
        let ref_ids = refs_guard.rewrite("ax_", locators);

        let elements = ref_ids
            .into_iter()
            .zip(raw.elements)
            .map(|(reference, el)| AxElement {
                reference,
                role: el.role,
                label: el.label,
                value: el.value,
                enabled: el.enabled,
            })
            .collect();

        Ok(AxSnapshot {
            app_name: raw.app_name,
            elements,
        })
    }

    async fn resolve(&self, reference: &str) -> Result<AxLocator, AxError> {
        let refs_guard = self.refs.lock().await;
        match refs_guard.lookup(reference) {
            RefLookup::Found(locator) => Ok(locator.clone()),
            RefLookup::Unknown => Err(AxError::UnknownRef(reference.to_string())),
        }
    }

    pub async fn press_button(&self, reference: &str) -> Result<Value, AxError> {
        let locator = self.resolve(reference).await?;
        let script = jxa::press_button(&locator.app_name, locator.window_index, locator.flat_index);
        self.bridge.run_json(&script).await.map_err(map_bridge_error)
    }

    pub async fn set_value(&self, reference: &str, value: &str) -> Result<Value, AxError> {
        let locator = self.resolve(reference).await?;
        let script = jxa::set_value(
            &locator.app_name,
            locator.window_index,
            locator.flat_index,
            value,
        );
        self.bridge.run_json(&script).await.map_err(map_bridge_error)
    }

    pub async fn get_value(&self, reference: &str) -> Result<Value, AxError> {
        let locator = self.resolve(reference).await?;
        let script = jxa::get_value(&locator.app_name, locator.window_index, locator.flat_index);
        self.bridge.run_json(&script).await.map_err(map_bridge_error)
    }

    pub async fn focus(&self, reference: &str) -> Result<Value, AxError> {
        let locator = self.resolve(reference).await?;
        let script = jxa::focus(&locator.app_name, locator.window_index, locator.flat_index);
        self.bridge.run_json(&script).await.map_err(map_bridge_error)
    }

    pub async fn menu_click(&self, app_name: &str, menu_path: &[String]) -> Result<Value, AxError> {
        let script = jxa::menu_click(app_name, menu_path);
        self.bridge.run_json(&script).await.map_err(map_bridge_error)
    }

    /// Takes a fresh snapshot, then keeps only elements whose role, label, or
    /// value contains `query` (case-insensitive). The ref table is rewritten
    /// from the full snapshot, not the filtered subset, so refs returned here
    /// stay valid against later `press_button`/`set_value`/... calls.
    pub async fn find_element(&self, app_name: &str, query: &str) -> Result<AxSnapshot, AxError> {
        let full = self.snapshot(app_name).await?;
        let needle = query.to_lowercase();
        let elements = full
            .elements
            .into_iter()
            .filter(|el| {
                el.role.to_lowercase().contains(&needle)
                    || el.label.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
                    || el.value.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .collect();
        Ok(AxSnapshot {
            app_name: full.app_name,
            elements,
        })
    }
}

fn map_bridge_error(err: BridgeError) -> AxError {
    match err {
        BridgeError::PermissionDenied => AxError::PermissionDenied(err.to_string()),
        BridgeError::AppNotFound(m) => AxError::AppNotFound(m),
        BridgeError::Timeout => AxError::Timeout,
        BridgeError::ScriptFailed(m) => AxError::ScriptFailed(m),
        BridgeError::Io(m) => AxError::ScriptFailed(m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> AccessibilityClient {
        let bridge = ScriptingBridge::new(None, Duration::from_secs(15), 10 * 1024 * 1024);
        AccessibilityClient::new(bridge, 3, 100, 200)
    }

    #[tokio::test]
    async fn unknown_ref_before_any_snapshot() {
        let client = client();
        let err = client.resolve("ax_1").await.unwrap_err();
        assert!(matches!(err, AxError::UnknownRef(_)));
    }

    #[tokio::test]
    async fn ref_from_previous_snapshot_is_unknown_after_rewrite() {
        let client = client();
        let raw_first = serde_json::json!({
            "appName": "Finder",
            "elements": [{"windowIndex":0,"flatIndex":1,"role":"AXButton","label":"A","value":null,"enabled":true}],
        });
        let first = client.rewrite_from_raw(raw_first).await.unwrap();
        let raw_second = serde_json::json!({
            "appName": "Finder",
            "elements": [{"windowIndex":0,"flatIndex":2,"role":"AXButton","label":"B","value":null,"enabled":true}],
        });
        client.rewrite_from_raw(raw_second).await.unwrap();

        let stale_ref = &first.elements[0].reference;
        let err = client.resolve(stale_ref).await.unwrap_err();
        assert!(matches!(err, AxError::UnknownRef(_)));
    }
}
