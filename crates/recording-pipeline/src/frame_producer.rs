//! Frame producer (spec.md §4.C11): consumes screenshot triggers, debounces
//! them, and writes PNG frames named `frame-<6-digit relative ms>.png`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use tokio::sync::mpsc::Receiver;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};
use vision_stratum::capture::ScreenCapture;

use core_types::FrameMap;

use crate::errors::RecordingError;
use crate::triggers::{FrameDebounce, TriggerReason};

/// Captures a screenshot, returning raw PNG bytes plus dimensions. The
/// production implementation wraps [`ScreenCapture`]; recording-pipeline
/// only needs base64-decoded bytes to write to disk.
pub async fn capture_frame_png(capture: &ScreenCapture) -> Result<Vec<u8>, RecordingError> {
    let (base64_png, _width, _height) = capture
        .capture_fullscreen()
        .await
        .map_err(|err| RecordingError::CaptureFailed(err.to_string()))?;
    BASE64
        .decode(base64_png)
        .map_err(|err| RecordingError::CaptureFailed(format!("invalid base64 frame data: {err}")))
}

pub fn frame_file_name(relative_ms: u64) -> String {
    format!("frame-{relative_ms:06}.png")
}

pub struct FrameProducer {
    capture: ScreenCapture,
    frames_dir: PathBuf,
    debounce: FrameDebounce,
}

impl FrameProducer {
    pub fn new(capture: ScreenCapture, frames_dir: PathBuf, debounce_window_ms: u64) -> Self {
        Self {
            capture,
            frames_dir,
            debounce: FrameDebounce::new(debounce_window_ms),
        }
    }

    /// Consumes triggers until the channel closes or `stop` resolves,
    /// writing accepted frames into `frames` (shared with the manifest
    /// builder) keyed by their session-relative millisecond offset.
    pub async fn run(
        mut self,
        session_start: Instant,
        mut triggers_rx: Receiver<TriggerReason>,
        frames: Arc<Mutex<FrameMap>>,
        mut stop: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = &mut stop => break,

                trigger = triggers_rx.recv() => {
                    match trigger {
                        Some(_) => self.handle_trigger(session_start, &frames).await,
                        None => break,
                    }
                }
            }
        }
    }

    async fn handle_trigger(&mut self, session_start: Instant, frames: &Arc<Mutex<FrameMap>>) {
        let at_ms = session_start.elapsed().as_millis() as u64;
        if !self.debounce.allow(at_ms) {
            debug!(at_ms, "frame-producer: dropping debounced trigger");
            return;
        }

        match self.capture_and_store(at_ms).await {
            Ok(path) => frames.lock().insert(at_ms, path),
            Err(err) => warn!(error = %err, at_ms, "frame-producer: capture failed"),
        }
    }

    async fn capture_and_store(&self, at_ms: u64) -> Result<String, RecordingError> {
        let bytes = capture_frame_png(&self.capture).await?;
        let file_name = frame_file_name(at_ms);
        let path = self.frames_dir.join(&file_name);
        write_frame(&path, &bytes).await?;
        Ok(file_name)
    }
}

async fn write_frame(path: &Path, bytes: &[u8]) -> Result<(), RecordingError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| RecordingError::Io(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_file_names_are_six_digit_zero_padded() {
        assert_eq!(frame_file_name(0), "frame-000000.png");
        assert_eq!(frame_file_name(42), "frame-000042.png");
        assert_eq!(frame_file_name(123_456), "frame-123456.png");
    }
}
