use serde::{Deserialize, Serialize};

/// A locator stored in the accessibility ref table: the owning application,
/// its window index, and the element's flat position in
/// `window.entireContents()` at snapshot time (spec.md §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AxLocator {
    pub app_name: String,
    pub window_index: usize,
    pub flat_index: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AxElement {
    #[serde(rename = "ref")]
    pub reference: String,
    pub role: String,
    pub label: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AxSnapshot {
    pub app_name: String,
    pub elements: Vec<AxElement>,
}

/// A node in the depth-limited display tree returned by `get_tree`. The
/// `display_id` is synthetic (`ax_k`) and is never stored in the ref table
/// (spec.md §4.C5 point 1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeNode {
    pub display_id: String,
    pub role: String,
    pub label: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// The fixed interactive-role set `snapshot()` filters `entireContents()`
/// against (spec.md §4.C5 point 2). Matched case-insensitively, with or
/// without the `AX` role prefix the scripting bridge reports.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "textfield",
    "textarea",
    "checkbox",
    "radiobutton",
    "popupbutton",
    "combobox",
    "slider",
    "menuitem",
    "link",
    "incrementor",
    "disclosuretriangle",
    "tab",
    "colorwell",
    "datefield",
];

pub fn normalize_role(role: &str) -> String {
    role.trim()
        .trim_start_matches("AX")
        .to_ascii_lowercase()
        .replace(['_', ' '], "")
}

pub fn is_interactive_role(role: &str) -> bool {
    let normalized = normalize_role(role);
    INTERACTIVE_ROLES.iter().any(|r| *r == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_matches_with_or_without_ax_prefix() {
        assert!(is_interactive_role("AXButton"));
        assert!(is_interactive_role("button"));
        assert!(is_interactive_role("Button"));
        assert!(!is_interactive_role("AXGroup"));
    }
}
