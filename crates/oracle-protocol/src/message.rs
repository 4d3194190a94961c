//! The per-turn message shape sent to the oracle (spec.md §6 "Oracle
//! contract"). Only the structure is specified here — the oracle itself is
//! an external collaborator, out of scope per spec.md §1.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Image {
        media_type: String,
        /// Base64-encoded image bytes.
        data: String,
    },
    Text {
        text: String,
    },
}

impl ContentBlock {
    pub fn image_png(data: impl Into<String>) -> Self {
        ContentBlock::Image {
            media_type: "image/png".to_string(),
            data: data.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl OracleMessage {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Builds the per-turn user message: one image block (current screenshot)
/// followed by one text block (goal, step number, window context,
/// structured element list, menu bar, recent actions) — spec.md §6.
pub fn build_user_message(
    goal: &str,
    step: u32,
    observation: &core_types::Observation,
) -> OracleMessage {
    let mut text = format!("Goal: {goal}\nStep: {step}\n");

    if let Some(app) = &observation.frontmost_app {
        text.push_str(&format!("Frontmost app: {app}\n"));
    }
    if let Some(title) = &observation.window_title {
        text.push_str(&format!("Window title: {title}\n"));
    }
    if !observation.menu_bar_items.is_empty() {
        text.push_str(&format!("Menu bar: {}\n", observation.menu_bar_items.join(", ")));
    }

    match observation.available_layer {
        core_types::AvailableLayer::Browser => {
            if let Some(page) = &observation.browser_page {
                text.push_str(&format!("Page: {} ({})\n", page.title.clone().unwrap_or_default(), page.url));
            }
            text.push_str("Browser elements:\n");
            for el in &observation.browser_elements {
                text.push_str(&format!(
                    "  {} [{}] {}\n",
                    el.reference,
                    el.role,
                    el.label.clone().unwrap_or_default()
                ));
            }
        }
        core_types::AvailableLayer::Accessibility => {
            text.push_str("Desktop elements:\n");
            for el in &observation.desktop_elements {
                text.push_str(&format!(
                    "  {} [{}] {}\n",
                    el.reference,
                    el.role,
                    el.label.clone().unwrap_or_default()
                ));
            }
        }
        core_types::AvailableLayer::VisionOnly => {
            text.push_str("No structured element data available; use vision coordinate actions.\n");
        }
    }

    if !observation.recent_actions.is_empty() {
        text.push_str("Recent actions:\n");
        for action in &observation.recent_actions {
            let status = if action.ok { "ok" } else { "error" };
            text.push_str(&format!(
                "  {}.{} ({status}): {}\n",
                action.layer, action.action, action.summary
            ));
        }
    }

    OracleMessage::user(vec![
        ContentBlock::image_png(observation.screenshot_base64.clone()),
        ContentBlock::text(text),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{AvailableLayer, ElementRecord, Observation};

    fn base_observation() -> Observation {
        Observation {
            screenshot_base64: "Zm9v".to_string(),
            screenshot_width: 100,
            screenshot_height: 50,
            frontmost_app: Some("Finder".to_string()),
            window_title: Some("Desktop".to_string()),
            menu_bar_items: vec!["File".to_string(), "Edit".to_string()],
            recent_actions: vec![],
            browser_elements: vec![],
            browser_page: None,
            desktop_elements: vec![ElementRecord {
                reference: "ax_1".to_string(),
                role: "button".to_string(),
                label: Some("OK".to_string()),
                value: None,
                enabled: true,
            }],
            available_layer: AvailableLayer::Accessibility,
        }
    }

    #[test]
    fn user_message_carries_one_image_block_and_one_text_block() {
        let msg = build_user_message("open settings", 1, &base_observation());
        assert_eq!(msg.content.len(), 2);
        assert!(matches!(msg.content[0], ContentBlock::Image { .. }));
        assert!(matches!(msg.content[1], ContentBlock::Text { .. }));
    }

    #[test]
    fn text_block_embeds_desktop_elements_for_accessibility_layer() {
        let msg = build_user_message("goal", 2, &base_observation());
        let ContentBlock::Text { text } = &msg.content[1] else {
            panic!("expected a text block");
        };
        assert!(text.contains("ax_1"));
        assert!(text.contains("Step: 2"));
    }
}
