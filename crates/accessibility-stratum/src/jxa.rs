//! JXA (`osascript -l JavaScript`) script templates run through the
//! scripting bridge. Every caller-provided string is embedded via
//! [`scripting_bridge::js_literal`] so nothing reaches the script unescaped
//! (spec.md §4.C4 "String embedding rule").

use scripting_bridge::js_literal;

const HELPERS: &str = r#"
function seLabel(el) {
    try {
        var title = null, desc = null, name = null;
        try { title = el.title(); } catch (e) {}
        try { desc = el.description(); } catch (e) {}
        try { name = el.name(); } catch (e) {}
        var label = title || desc || name || "";
        return label.length > 100 ? label.slice(0, 100) : label;
    } catch (e) { return ""; }
}
function seValue(el) {
    try { var v = el.value(); return v === undefined ? null : String(v); } catch (e) { return null; }
}
function seEnabled(el) {
    try { return el.enabled(); } catch (e) { return true; }
}
function seRole(el) {
    try { return el.role(); } catch (e) { return "unknown"; }
}
"#;

pub fn get_tree(app_name: &str, max_depth: usize, max_children: usize) -> String {
    format!(
        r#"
        {helpers}
        (() => {{
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var counter = {{n: 0}};
            function walk(el, depth) {{
                counter.n += 1;
                var node = {{
                    displayId: "ax_" + counter.n,
                    role: seRole(el),
                    label: seLabel(el) || null,
                    value: seValue(el),
                    enabled: seEnabled(el),
                    focused: (function() {{ try {{ return el.focused(); }} catch (e) {{ return false; }} }})(),
                    children: [],
                }};
                if (depth >= {max_depth}) return node;
                var kids = [];
                try {{ kids = el.uiElements(); }} catch (e) {{ kids = []; }}
                var cap = Math.min(kids.length, {max_children});
                for (var i = 0; i < cap; i++) {{
                    node.children.push(walk(kids[i], depth + 1));
                }}
                return node;
            }}
            var windows = proc.windows();
            var out = [];
            for (var w = 0; w < windows.length; w++) {{
                out.push(walk(windows[w], 0));
            }}
            return JSON.stringify({{ windows: out }});
        }})()
        "#,
        helpers = HELPERS,
        app = js_literal(app_name),
        max_depth = max_depth,
        max_children = max_children,
    )
}

pub fn snapshot(app_name: &str, interactive_roles: &[&str], max_total: usize) -> String {
    let roles_js = interactive_roles
        .iter()
        .map(|r| js_literal(r))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"
        {helpers}
        (() => {{
            var interactive = [{roles}];
            function normalize(role) {{
                return role.replace(/^AX/, "").toLowerCase().replace(/[_ ]/g, "");
            }}
            function isInteractive(role) {{
                var n = normalize(role);
                return interactive.indexOf(n) !== -1;
            }}
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var windows = proc.windows();
            var out = [];
            var total = 0;
            for (var w = 0; w < windows.length && total < {max_total}; w++) {{
                var contents = windows[w].entireContents();
                for (var i = 0; i < contents.length && total < {max_total}; i++) {{
                    var el = contents[i];
                    var role = seRole(el);
                    if (!isInteractive(role)) continue;
                    out.push({{
                        windowIndex: w,
                        flatIndex: i,
                        role: role,
                        label: seLabel(el) || null,
                        value: seValue(el),
                        enabled: seEnabled(el),
                    }});
                    total += 1;
                }}
            }}
            return JSON.stringify({{ appName: {app}, elements: out }});
        }})()
        "#,
        helpers = HELPERS,
        roles = roles_js,
        app = js_literal(app_name),
        max_total = max_total,
    )
}

fn resolve_element(app_name: &str, window_index: usize, flat_index: usize) -> String {
    format!(
        r#"
        var se = Application("System Events");
        var proc = se.processes.whose({{name: {app}}})[0];
        var windows = proc.windows();
        if ({window_index} >= windows.length) {{ JSON.stringify({{error: "stale_window"}}); throw "stale"; }}
        var contents = windows[{window_index}].entireContents();
        if ({flat_index} >= contents.length) {{ throw "stale"; }}
        var el = contents[{flat_index}];
        "#,
        app = js_literal(app_name),
        window_index = window_index,
        flat_index = flat_index,
    )
}

pub fn press_button(app_name: &str, window_index: usize, flat_index: usize) -> String {
    format!(
        r#"
        {helpers}
        (() => {{
            {resolve}
            try {{
                el.actions.byName("AXPress").perform();
                return JSON.stringify({{ pressed: true, via: "action" }});
            }} catch (e) {{
                try {{
                    var pos = el.position();
                    var size = el.size();
                    var cx = pos[0] + size[0] / 2;
                    var cy = pos[1] + size[1] / 2;
                    var se2 = Application("System Events");
                    se2.click({{at: [cx, cy]}});
                    return JSON.stringify({{ pressed: true, via: "synthesized_click" }});
                }} catch (e2) {{
                    return JSON.stringify({{ error: String(e2) }});
                }}
            }}
        }})()
        "#,
        helpers = HELPERS,
        resolve = resolve_element(app_name, window_index, flat_index),
    )
}

pub fn set_value(app_name: &str, window_index: usize, flat_index: usize, value: &str) -> String {
    format!(
        r#"
        {helpers}
        (() => {{
            {resolve}
            try {{
                el.value = {value};
                return JSON.stringify({{ set: true, via: "direct" }});
            }} catch (e) {{
                try {{
                    el.focused = true;
                    var se2 = Application("System Events");
                    se2.keystroke("a", {{using: "command down"}});
                    se2.keystroke({value});
                    return JSON.stringify({{ set: true, via: "focus_select_type" }});
                }} catch (e2) {{
                    return JSON.stringify({{ error: String(e2) }});
                }}
            }}
        }})()
        "#,
        helpers = HELPERS,
        resolve = resolve_element(app_name, window_index, flat_index),
        value = js_literal(value),
    )
}

pub fn get_value(app_name: &str, window_index: usize, flat_index: usize) -> String {
    format!(
        r#"
        {helpers}
        (() => {{
            {resolve}
            return JSON.stringify({{ value: seValue(el) }});
        }})()
        "#,
        helpers = HELPERS,
        resolve = resolve_element(app_name, window_index, flat_index),
    )
}

pub fn focus(app_name: &str, window_index: usize, flat_index: usize) -> String {
    format!(
        r#"
        {helpers}
        (() => {{
            {resolve}
            try {{
                el.focused = true;
                return JSON.stringify({{ focused: true }});
            }} catch (e) {{
                return JSON.stringify({{ error: String(e) }});
            }}
        }})()
        "#,
        helpers = HELPERS,
        resolve = resolve_element(app_name, window_index, flat_index),
    )
}

/// Navigates `menuBarItems → menus[0] → menuItems …` by name through
/// `menu_path` and clicks the leaf item (spec.md §4.C5 `menu_click`).
pub fn menu_click(app_name: &str, menu_path: &[String]) -> String {
    let path_js = menu_path
        .iter()
        .map(|segment| js_literal(segment))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"
        (() => {{
            var app = Application({app});
            app.activate();
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var path = [{path}];
            var cursor = proc.menuBars[0].menuBarItems.byName(path[0]);
            for (var i = 1; i < path.length - 1; i++) {{
                cursor = cursor.menus[0].menuItems.byName(path[i]);
            }}
            var leaf = path.length === 1 ? cursor : cursor.menus[0].menuItems.byName(path[path.length - 1]);
            leaf.click();
            return JSON.stringify({{ clicked: true, path: path }});
        }})()
        "#,
        app = js_literal(app_name),
        path = path_js,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_tree_embeds_depth_and_cap() {
        let script = get_tree("Finder", 3, 100);
        assert!(script.contains("depth >= 3"));
        assert!(script.contains("Math.min(kids.length, 100)"));
    }

    #[test]
    fn snapshot_embeds_role_allowlist() {
        let script = snapshot("Finder", &["button", "link"], 200);
        assert!(script.contains("\"button\""));
        assert!(script.contains("\"link\""));
        assert!(script.contains("total < 200"));
    }

    #[test]
    fn menu_click_embeds_escaped_path() {
        let script = menu_click("TextEdit", &["File".to_string(), "Save".to_string()]);
        assert!(script.contains("\"File\""));
        assert!(script.contains("\"Save\""));
    }
}
