use std::time::Duration;

use scripting_bridge::ScriptingBridge;
use serde::Deserialize;

use crate::capture;
use crate::errors::VisionError;
use crate::model::{PartialAccessibility, PartialAxElement};

const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "textfield",
    "textarea",
    "checkbox",
    "radiobutton",
    "popupbutton",
    "combobox",
    "menuitem",
    "link",
];

/// Partial accessibility collection: interactive elements on the frontmost
/// app's windows, subject to a hard timeout racing a timer. Menu-bar items
/// are fetched independently even when the AX query itself times out
/// (spec.md §4.C6, §5 "Cancellation and timeouts").
pub async fn collect(bridge: &ScriptingBridge, app: &str, timeout: Duration) -> PartialAccessibility {
    let menu_bar_items = capture::menu_bar_items(bridge, app).await.unwrap_or_default();

    let elements_future = query_elements(bridge, app);
    match tokio::time::timeout(timeout, elements_future).await {
        Ok(Ok(elements)) => PartialAccessibility {
            available: true,
            elements,
            menu_bar_items,
        },
        Ok(Err(_)) | Err(_) => PartialAccessibility {
            available: false,
            elements: Vec::new(),
            menu_bar_items,
        },
    }
}

async fn query_elements(bridge: &ScriptingBridge, app: &str) -> Result<Vec<PartialAxElement>, VisionError> {
    let roles = INTERACTIVE_ROLES
        .iter()
        .map(|r| scripting_bridge::js_literal(r))
        .collect::<Vec<_>>()
        .join(", ");
    let script = format!(
        r#"
        (() => {{
            var interactive = [{roles}];
            function normalize(role) {{
                return role.replace(/^AX/, "").toLowerCase().replace(/[_ ]/g, "");
            }}
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var out = [];
            var windows = proc.windows();
            for (var w = 0; w < windows.length; w++) {{
                var contents = windows[w].entireContents();
                for (var i = 0; i < contents.length && out.length < 50; i++) {{
                    var el = contents[i];
                    var role = "unknown";
                    try {{ role = el.role(); }} catch (e) {{}}
                    if (interactive.indexOf(normalize(role)) === -1) continue;
                    var label = null;
                    try {{ label = el.title() || el.description() || el.name() || null; }} catch (e) {{}}
                    var value = null;
                    try {{ var v = el.value(); value = v === undefined ? null : String(v); }} catch (e) {{}}
                    out.push({{ role: role, label: label, value: value }});
                }}
            }}
            return JSON.stringify({{ elements: out }});
        }})()
        "#,
        roles = roles,
        app = scripting_bridge::js_literal(app),
    );

    let value = bridge.run_json(&script).await.map_err(capture::map_bridge_error)?;
    #[derive(Deserialize)]
    struct Wrapper {
        elements: Vec<PartialAxElement>,
    }
    let wrapper: Wrapper = serde_json::from_value(value).map_err(|e| VisionError::ScriptFailed(e.to_string()))?;
    Ok(wrapper.elements)
}
