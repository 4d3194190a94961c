use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaptureMode {
    Fullscreen,
    Region,
    Window,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// The capture mode actually used, surfaced so callers can distinguish a
/// true window capture from a fullscreen fallback (spec.md §4.C6,
/// §9 "Window-screenshot fallback ... deliberate").
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureType {
    Fullscreen,
    Region,
    Window,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenshotResult {
    pub screenshot_base64: String,
    pub width: u32,
    pub height: u32,
    pub capture_type: CaptureType,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartialAxElement {
    pub role: String,
    pub label: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartialAccessibility {
    pub available: bool,
    pub elements: Vec<PartialAxElement>,
    pub menu_bar_items: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskContext {
    pub current_step: Option<String>,
    pub expected_outcome: Option<String>,
    pub workflow_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: String,
    pub ok: bool,
    pub summary: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContextCollection {
    pub screenshot: ScreenshotResult,
    pub frontmost_app: Option<String>,
    pub window_title: Option<String>,
    pub window_bounds: Option<WindowBounds>,
    pub screen_size: ScreenSize,
    pub accessibility: PartialAccessibility,
    pub recent_actions: Vec<ActionRecord>,
    pub task_context: Option<TaskContext>,
}

/// A point in the fixed image-space (width 1280, aspect-preserved) that
/// coordinate actions arrive in, before rescaling to host logical pixels
/// (spec.md §4.C6).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}
