//! The composite state a single agent-loop step passes to the oracle.

use serde::{Deserialize, Serialize};

/// Which structured element data accompanies an [`Observation`], per spec.md
/// §3 invariant 5: browser implies non-empty browser elements, accessibility
/// implies non-empty desktop elements, vision-only implies neither is present.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvailableLayer {
    Browser,
    Accessibility,
    VisionOnly,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Opaque reference issued by the owning stratum's ref table.
    pub reference: String,
    pub role: String,
    pub label: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageMetadata {
    pub url: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecentAction {
    pub action_id: String,
    pub layer: String,
    pub action: String,
    pub ok: bool,
    pub summary: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observation {
    /// Base64-encoded PNG screenshot.
    pub screenshot_base64: String,
    pub screenshot_width: u32,
    pub screenshot_height: u32,
    pub frontmost_app: Option<String>,
    pub window_title: Option<String>,
    #[serde(default)]
    pub menu_bar_items: Vec<String>,
    /// Up to the 5 most recent action records, newest last.
    #[serde(default)]
    pub recent_actions: Vec<RecentAction>,
    #[serde(default)]
    pub browser_elements: Vec<ElementRecord>,
    pub browser_page: Option<PageMetadata>,
    #[serde(default)]
    pub desktop_elements: Vec<ElementRecord>,
    pub available_layer: AvailableLayer,
}

impl Observation {
    /// Checks spec.md §3 invariant 5.
    pub fn is_well_formed(&self) -> bool {
        match self.available_layer {
            AvailableLayer::Browser => !self.browser_elements.is_empty(),
            AvailableLayer::Accessibility => !self.desktop_elements.is_empty(),
            AvailableLayer::VisionOnly => {
                self.browser_elements.is_empty() && self.desktop_elements.is_empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(available_layer: AvailableLayer) -> Observation {
        Observation {
            screenshot_base64: String::new(),
            screenshot_width: 0,
            screenshot_height: 0,
            frontmost_app: None,
            window_title: None,
            menu_bar_items: vec![],
            recent_actions: vec![],
            browser_elements: vec![],
            browser_page: None,
            desktop_elements: vec![],
            available_layer,
        }
    }

    fn element() -> ElementRecord {
        ElementRecord {
            reference: "e1".into(),
            role: "button".into(),
            label: Some("Submit".into()),
            value: None,
            enabled: true,
        }
    }

    #[test]
    fn vision_only_forbids_structured_elements() {
        assert!(base(AvailableLayer::VisionOnly).is_well_formed());
        let mut obs = base(AvailableLayer::VisionOnly);
        obs.browser_elements.push(element());
        assert!(!obs.is_well_formed());
    }

    #[test]
    fn browser_requires_nonempty_elements() {
        assert!(!base(AvailableLayer::Browser).is_well_formed());
        let mut obs = base(AvailableLayer::Browser);
        obs.browser_elements.push(element());
        assert!(obs.is_well_formed());
    }
}
