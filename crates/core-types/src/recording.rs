//! Recording pipeline data model: events, frames, narration, manifests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw input events captured by the native event-monitor helper, after
/// NDJSON parsing and keystroke coalescing (spec.md §3, §4.C11).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordingEvent {
    Click {
        button: String,
        x: i32,
        y: i32,
    },
    DoubleClick {
        x: i32,
        y: i32,
    },
    Typing {
        text: String,
        key_count: u32,
        start_ms: u64,
        end_ms: u64,
    },
    Hotkey {
        keys: Vec<String>,
    },
    Scroll {
        x: i32,
        y: i32,
        delta_y: f64,
    },
    AppSwitch {
        from_app: Option<String>,
        to_app: String,
    },
    WindowFocus {
        app: String,
        title: String,
    },
}

/// An event annotated with its absolute and session-relative timestamps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimestampedEvent {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub at: DateTime<Utc>,
    /// Always equal to `at - session_start` (spec.md §3 invariant 3).
    pub relative_ms: u64,
    #[serde(flatten)]
    pub event: RecordingEvent,
}

/// Ordered mapping from session-relative ms to a relative PNG path on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameMap(pub BTreeMap<u64, String>);

impl FrameMap {
    pub fn insert(&mut self, relative_ms: u64, path: String) {
        self.0.insert(relative_ms, path);
    }

    /// Most recent frame whose timestamp is `<= at_ms`, per spec.md §3
    /// invariant 4 / §8 frame-alignment property.
    pub fn frame_at_or_before(&self, at_ms: u64) -> Option<&String> {
        self.0.range(..=at_ms).next_back().map(|(_, path)| path)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub frame: Option<String>,
    pub event: TimestampedEvent,
    pub narration: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionManifest {
    pub id: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub frame_count: usize,
    pub event_count: usize,
    pub audio_file: Option<String>,
    pub entries: Vec<ManifestEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_map_picks_latest_frame_not_after_event() {
        let mut frames = FrameMap::default();
        frames.insert(0, "frame-000000.png".into());
        frames.insert(500, "frame-000500.png".into());
        frames.insert(1200, "frame-001200.png".into());

        assert_eq!(
            frames.frame_at_or_before(900),
            Some(&"frame-000500.png".to_string())
        );
        assert_eq!(
            frames.frame_at_or_before(1200),
            Some(&"frame-001200.png".to_string())
        );
        assert_eq!(frames.frame_at_or_before(0), Some(&"frame-000000.png".to_string()));
    }

    #[test]
    fn frame_map_empty_before_any_frame() {
        let mut frames = FrameMap::default();
        frames.insert(500, "frame-000500.png".into());
        assert_eq!(frames.frame_at_or_before(100), None);
    }
}
