use std::time::Duration;

use parking_lot::Mutex;
use scripting_bridge::ScriptingBridge;
use subprocess_runner::SubprocessRunner;
use tracing::info;

use crate::actions;
use crate::capture::{self, ScreenCapture};
use crate::context;
use crate::errors::VisionError;
use crate::model::{
    ActionRecord, CaptureType, ContextCollection, ImagePoint, ScreenSize, ScreenshotResult,
    TaskContext,
};
use crate::ring::ActionRing;
use crate::{coords, keycombo::KeyTarget};

pub struct VisionConfig {
    pub image_space_width: u32,
    pub ring_buffer_size: usize,
    pub partial_ax_timeout: Duration,
    pub verification_delay: Duration,
}

/// Owns the screen-capture tool wrapper, the scripting bridge, and the
/// action-history ring buffer (spec.md §4.C6, §5).
pub struct VisionClient {
    bridge: ScriptingBridge,
    capture: ScreenCapture,
    runner: SubprocessRunner,
    config: VisionConfig,
    ring: Mutex<ActionRing>,
}

impl VisionClient {
    pub fn new(bridge: ScriptingBridge, capture_timeout: Duration, config: VisionConfig) -> Self {
        Self {
            capture: ScreenCapture::new(capture_timeout),
            bridge,
            runner: SubprocessRunner::new(),
            ring: Mutex::new(ActionRing::new(config.ring_buffer_size)),
            config,
        }
    }

    pub async fn screenshot_fullscreen(&self) -> Result<ScreenshotResult, VisionError> {
        let (base64, width, height) = self.capture.capture_fullscreen().await?;
        Ok(ScreenshotResult {
            screenshot_base64: base64,
            width,
            height,
            capture_type: CaptureType::Fullscreen,
        })
    }

    /// Captures the named app's window; falls back to fullscreen if its
    /// bounds cannot be obtained (spec.md §4.C6, §9 fallback note).
    pub async fn screenshot_window(&self, app: &str) -> Result<ScreenshotResult, VisionError> {
        match capture::window_bounds(&self.bridge, app).await? {
            Some(bounds) => {
                let (base64, width, height) = self.capture.capture_region(&bounds).await?;
                Ok(ScreenshotResult {
                    screenshot_base64: base64,
                    width,
                    height,
                    capture_type: CaptureType::Window,
                })
            }
            None => self.screenshot_fullscreen().await,
        }
    }

    pub async fn screen_size(&self) -> Result<ScreenSize, VisionError> {
        capture::screen_size(&self.bridge).await
    }

    pub async fn context_collection(
        &self,
        app: Option<&str>,
        task_context: Option<TaskContext>,
    ) -> Result<ContextCollection, VisionError> {
        let frontmost = capture::frontmost_app(&self.bridge).await.ok().flatten();
        let target_app = app.or(frontmost.as_deref());

        let screenshot = match target_app {
            Some(app) => self.screenshot_window(app).await?,
            None => self.screenshot_fullscreen().await?,
        };

        let window_title = match target_app {
            Some(app) => capture::window_title(&self.bridge, app).await.ok().flatten(),
            None => None,
        };
        let window_bounds = match target_app {
            Some(app) => capture::window_bounds(&self.bridge, app).await.ok().flatten(),
            None => None,
        };
        let screen_size = self.screen_size().await.unwrap_or(ScreenSize {
            width: 0,
            height: 0,
        });

        let accessibility = match target_app {
            Some(app) => context::collect(&self.bridge, app, self.config.partial_ax_timeout).await,
            None => crate::model::PartialAccessibility {
                available: false,
                elements: Vec::new(),
                menu_bar_items: Vec::new(),
            },
        };

        let recent_actions = self.ring.lock().recent(5);

        Ok(ContextCollection {
            screenshot,
            frontmost_app: frontmost,
            window_title,
            window_bounds,
            screen_size,
            accessibility,
            recent_actions,
            task_context,
        })
    }

    async fn screen_for_scaling(&self) -> Result<ScreenSize, VisionError> {
        self.screen_size().await
    }

    async fn record_and_verify(
        &self,
        action: &str,
        result: Result<(), VisionError>,
        verify: bool,
    ) -> Result<Option<ScreenshotResult>, VisionError> {
        let ok = result.is_ok();
        self.ring.lock().push(ActionRecord {
            action: action.to_string(),
            ok,
            summary: if ok { "ok".to_string() } else { "failed".to_string() },
        });
        result?;

        if verify {
            tokio::time::sleep(self.config.verification_delay).await;
            let shot = self.screenshot_fullscreen().await?;
            Ok(Some(shot))
        } else {
            Ok(None)
        }
    }

    pub async fn click_coordinates(
        &self,
        point: ImagePoint,
        verify: bool,
    ) -> Result<(i32, i32, Option<ScreenshotResult>), VisionError> {
        let screen = self.screen_for_scaling().await?;
        let (x, y) = coords::scale_to_screen(point, self.config.image_space_width, &screen);
        let result = actions::click(&self.runner, x, y).await;
        let verification = self.record_and_verify("click_coordinates", result, verify).await?;
        Ok((x, y, verification))
    }

    pub async fn double_click(
        &self,
        point: ImagePoint,
        verify: bool,
    ) -> Result<(i32, i32, Option<ScreenshotResult>), VisionError> {
        let screen = self.screen_for_scaling().await?;
        let (x, y) = coords::scale_to_screen(point, self.config.image_space_width, &screen);
        let result = actions::double_click(&self.runner, x, y).await;
        let verification = self.record_and_verify("double_click", result, verify).await?;
        Ok((x, y, verification))
    }

    pub async fn right_click(
        &self,
        point: ImagePoint,
        verify: bool,
    ) -> Result<(i32, i32, Option<ScreenshotResult>), VisionError> {
        let screen = self.screen_for_scaling().await?;
        let (x, y) = coords::scale_to_screen(point, self.config.image_space_width, &screen);
        let result = actions::right_click(&self.runner, x, y).await;
        let verification = self.record_and_verify("right_click", result, verify).await?;
        Ok((x, y, verification))
    }

    pub async fn drag(
        &self,
        from: ImagePoint,
        to: ImagePoint,
        verify: bool,
    ) -> Result<Option<ScreenshotResult>, VisionError> {
        let screen = self.screen_for_scaling().await?;
        let (fx, fy) = coords::scale_to_screen(from, self.config.image_space_width, &screen);
        let (tx, ty) = coords::scale_to_screen(to, self.config.image_space_width, &screen);
        let result = actions::drag(&self.runner, fx, fy, tx, ty).await;
        self.record_and_verify("drag", result, verify).await
    }

    pub async fn scroll(
        &self,
        point: ImagePoint,
        delta_y: f64,
        verify: bool,
    ) -> Result<Option<ScreenshotResult>, VisionError> {
        let screen = self.screen_for_scaling().await?;
        let (x, y) = coords::scale_to_screen(point, self.config.image_space_width, &screen);
        let result = actions::scroll(&self.runner, x, y, delta_y).await;
        self.record_and_verify("scroll", result, verify).await
    }

    pub async fn type_text(&self, text: &str, verify: bool) -> Result<Option<ScreenshotResult>, VisionError> {
        let result = actions::type_text(&self.bridge, text).await;
        self.record_and_verify("type_text", result, verify).await
    }

    pub async fn key_combo(&self, combo: &str, verify: bool) -> Result<Option<ScreenshotResult>, VisionError> {
        let result = actions::key_combo(&self.bridge, combo).await;
        self.record_and_verify("key_combo", result, verify).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_target_variants_compile() {
        let _ = KeyTarget::KeyCode(36);
    }
}
