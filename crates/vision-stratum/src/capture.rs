use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use scripting_bridge::{BridgeError, ScriptingBridge};
use subprocess_runner::{RunnerError, SpawnRequest, SubprocessRunner};
use tracing::warn;

use crate::errors::VisionError;
use crate::model::{ScreenSize, WindowBounds};

static CAPTURE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_capture_path() -> PathBuf {
    let pid = std::process::id();
    let counter = CAPTURE_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("uia-vision-{pid}-{counter}.png"))
}

/// Captures via the OS screen-capture tool (`screencapture`) writing a temp
/// PNG, reads it back as base64, then deletes it (spec.md §4.C6).
pub struct ScreenCapture {
    runner: SubprocessRunner,
    timeout: Duration,
}

impl ScreenCapture {
    pub fn new(timeout: Duration) -> Self {
        Self {
            runner: SubprocessRunner::new(),
            timeout,
        }
    }

    pub async fn capture_fullscreen(&self) -> Result<(String, u32, u32), VisionError> {
        self.run_capture(vec!["-x".to_string()]).await
    }

    pub async fn capture_region(&self, bounds: &WindowBounds) -> Result<(String, u32, u32), VisionError> {
        let region = format!("{},{},{},{}", bounds.x, bounds.y, bounds.width, bounds.height);
        self.run_capture(vec!["-x".to_string(), "-R".to_string(), region]).await
    }

    async fn run_capture(&self, extra_args: Vec<String>) -> Result<(String, u32, u32), VisionError> {
        let path = unique_capture_path();
        let mut args = extra_args;
        args.push(path.display().to_string());

        let request = SpawnRequest::new("screencapture", args).with_timeout(self.timeout);
        let output = self.runner.run(request).await.map_err(|err| match err {
            RunnerError::Timeout(_) => VisionError::Timeout,
            other => VisionError::CaptureFailed(other.to_string()),
        })?;

        if !output.success() {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(VisionError::CaptureFailed(output.stderr_string()));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|err| VisionError::Io(err.to_string()))?;
        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %err, "failed to remove temp screenshot file");
        }

        let dims = png_dimensions(&bytes);
        let base64 = BASE64.encode(&bytes);
        Ok(match dims {
            Some((w, h)) => (base64, w, h),
            None => (base64, 0, 0),
        })
    }
}

/// Reads width/height straight from a PNG's IHDR chunk, avoiding an image
/// decoding dependency for a value the capture tool already knows.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || &bytes[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}

pub async fn window_bounds(bridge: &ScriptingBridge, app: &str) -> Result<Option<WindowBounds>, VisionError> {
    let script = format!(
        r#"
        (() => {{
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var win = proc.windows[0];
            var pos = win.position();
            var size = win.size();
            return JSON.stringify({{ x: pos[0], y: pos[1], width: size[0], height: size[1] }});
        }})()
        "#,
        app = scripting_bridge::js_literal(app),
    );
    match bridge.run_json(&script).await {
        Ok(value) => {
            let bounds: WindowBoundsRaw =
                serde_json::from_value(value).map_err(|e| VisionError::ScriptFailed(e.to_string()))?;
            Ok(Some(WindowBounds {
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
            }))
        }
        Err(BridgeError::AppNotFound(_)) => Ok(None),
        Err(err) => Err(map_bridge_error(err)),
    }
}

#[derive(serde::Deserialize)]
struct WindowBoundsRaw {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

pub async fn screen_size(bridge: &ScriptingBridge) -> Result<ScreenSize, VisionError> {
    let script = r#"
        (() => {
            var se = Application("Finder");
            var bounds = se.desktop().properties().bounds || [0, 0, 1440, 900];
            return JSON.stringify({ width: bounds[2], height: bounds[3] });
        })()
    "#;
    let value = bridge.run_json(script).await.map_err(map_bridge_error)?;
    serde_json::from_value(value).map_err(|e| VisionError::ScriptFailed(e.to_string()))
}

pub async fn frontmost_app(bridge: &ScriptingBridge) -> Result<Option<String>, VisionError> {
    let script = r#"
        (() => {
            var se = Application("System Events");
            var front = se.processes.whose({frontmost: true})[0];
            return JSON.stringify({ app: front ? front.name() : null });
        })()
    "#;
    let value = bridge.run_json(script).await.map_err(map_bridge_error)?;
    #[derive(serde::Deserialize)]
    struct Wrapper {
        app: Option<String>,
    }
    let wrapper: Wrapper = serde_json::from_value(value).map_err(|e| VisionError::ScriptFailed(e.to_string()))?;
    Ok(wrapper.app)
}

pub async fn window_title(bridge: &ScriptingBridge, app: &str) -> Result<Option<String>, VisionError> {
    let script = format!(
        r#"
        (() => {{
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var win = proc.windows[0];
            return JSON.stringify({{ title: win ? win.name() : null }});
        }})()
        "#,
        app = scripting_bridge::js_literal(app),
    );
    match bridge.run_json(&script).await {
        Ok(value) => {
            #[derive(serde::Deserialize)]
            struct Wrapper {
                title: Option<String>,
            }
            let wrapper: Wrapper =
                serde_json::from_value(value).map_err(|e| VisionError::ScriptFailed(e.to_string()))?;
            Ok(wrapper.title)
        }
        Err(BridgeError::AppNotFound(_)) => Ok(None),
        Err(err) => Err(map_bridge_error(err)),
    }
}

pub async fn menu_bar_items(bridge: &ScriptingBridge, app: &str) -> Result<Vec<String>, VisionError> {
    let script = format!(
        r#"
        (() => {{
            var se = Application("System Events");
            var proc = se.processes.whose({{name: {app}}})[0];
            var items = proc.menuBars[0].menuBarItems.name();
            return JSON.stringify({{ items: items }});
        }})()
        "#,
        app = scripting_bridge::js_literal(app),
    );
    match bridge.run_json(&script).await {
        Ok(value) => {
            #[derive(serde::Deserialize)]
            struct Wrapper {
                items: Vec<String>,
            }
            let wrapper: Wrapper =
                serde_json::from_value(value).map_err(|e| VisionError::ScriptFailed(e.to_string()))?;
            Ok(wrapper.items)
        }
        Err(_) => Ok(Vec::new()),
    }
}

pub fn map_bridge_error(err: BridgeError) -> VisionError {
    match err {
        BridgeError::PermissionDenied => VisionError::PermissionDenied(err.to_string()),
        BridgeError::AppNotFound(m) => VisionError::AppNotFound(m),
        BridgeError::Timeout => VisionError::Timeout,
        BridgeError::ScriptFailed(m) => VisionError::ScriptFailed(m),
        BridgeError::Io(m) => VisionError::Io(m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_dimensions_from_png_ihdr() {
        // Minimal valid PNG signature + IHDR for a 4x3 image.
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        bytes.extend_from_slice(&[0, 0, 0, 13]); // length (unused by parser)
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(&3u32.to_be_bytes());
        assert_eq!(png_dimensions(&bytes), Some((4, 3)));
    }

    #[test]
    fn rejects_non_png_bytes() {
        assert_eq!(png_dimensions(b"not a png"), None);
    }
}
