use serde::{Deserialize, Serialize};

/// A locator stored in the browser ref table: a CSS selector plus the page
/// identity (its current URL) captured at snapshot time, used to detect a
/// stale route if the page navigates before the ref is used (spec.md §3).
#[derive(Clone, Debug)]
pub struct ElementLocator {
    pub selector: String,
    pub owning_page_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrowserElement {
    #[serde(rename = "ref")]
    pub reference: String,
    pub role: String,
    pub label: Option<String>,
    pub tag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotResult {
    pub page_url: String,
    pub page_title: String,
    pub elements: Vec<BrowserElement>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavigateResult {
    pub url: String,
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: String,
    pub url: String,
    pub title: String,
}
