//! Manifest builder (spec.md §4.C11): joins the event, frame, and narration
//! streams into a [`SessionManifest`].

use chrono::{DateTime, Utc};
use core_types::{FrameMap, ManifestEntry, SessionManifest, TimestampedEvent, TranscriptionSegment};

/// Picks narration for an event at `event_ms` (spec.md §4.C11, S4):
/// first pass prefers a segment that temporally contains the event; the
/// fallback pass picks the nearest segment within `proximity_window_ms`,
/// breaking ties in favor of segments that end before the event (per
/// spec.md §9's open question, a single candidate is trivially accepted).
pub fn pick_narration(
    segments: &[TranscriptionSegment],
    event_ms: u64,
    proximity_window_ms: i64,
) -> Option<String> {
    let event_ms = event_ms as f64;

    for segment in segments {
        let start_ms = segment.start_time * 1000.0;
        let end_ms = segment.end_time * 1000.0;
        if event_ms >= start_ms && event_ms <= end_ms {
            return Some(segment.text.clone());
        }
    }

    let mut best: Option<(f64, bool, &TranscriptionSegment)> = None;
    for segment in segments {
        let start_ms = segment.start_time * 1000.0;
        let end_ms = segment.end_time * 1000.0;
        let distance = if event_ms < start_ms {
            start_ms - event_ms
        } else {
            event_ms - end_ms
        };
        if distance > proximity_window_ms as f64 {
            continue;
        }
        let ends_before = end_ms <= event_ms;

        let is_better = match &best {
            None => true,
            Some((best_distance, best_ends_before, _)) => {
                distance < *best_distance || (distance == *best_distance && ends_before && !*best_ends_before)
            }
        };
        if is_better {
            best = Some((distance, ends_before, segment));
        }
    }

    best.map(|(_, _, segment)| segment.text.clone())
}

#[allow(clippy::too_many_arguments)]
pub fn build_manifest(
    id: String,
    description: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    events: &[TimestampedEvent],
    frames: &FrameMap,
    narration: &[TranscriptionSegment],
    audio_file: Option<String>,
    proximity_window_ms: i64,
) -> SessionManifest {
    let duration_ms = (end_time - start_time).num_milliseconds().max(0) as u64;

    let entries = events
        .iter()
        .map(|event| {
            let frame = frames.frame_at_or_before(event.relative_ms).cloned();
            let narration = pick_narration(narration, event.relative_ms, proximity_window_ms);
            ManifestEntry {
                frame,
                event: event.clone(),
                narration,
            }
        })
        .collect::<Vec<_>>();

    SessionManifest {
        id,
        description,
        start_time,
        end_time,
        duration_ms,
        frame_count: frames.0.len(),
        event_count: events.len(),
        audio_file,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RecordingEvent;

    fn segment(start: f64, end: f64, text: &str) -> TranscriptionSegment {
        TranscriptionSegment {
            text: text.to_string(),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn overlap_beats_proximity() {
        let segments = vec![segment(4.0, 6.0, "inside"), segment(10.0, 12.0, "far")];
        assert_eq!(pick_narration(&segments, 5_000, 3_000).as_deref(), Some("inside"));
    }

    #[test]
    fn proximity_scenario_s4_picks_the_nearer_segment_that_ends_first() {
        let segments = vec![segment(4.0, 5.0, "click file"), segment(5.5, 6.0, "then save")];
        assert_eq!(pick_narration(&segments, 5_200, 3_000).as_deref(), Some("click file"));
    }

    #[test]
    fn a_single_candidate_within_the_window_is_trivially_accepted() {
        let segments = vec![segment(10.0, 10.5, "only one")];
        assert_eq!(pick_narration(&segments, 12_000, 3_000).as_deref(), Some("only one"));
    }

    #[test]
    fn nothing_within_the_proximity_window_yields_none() {
        let segments = vec![segment(0.0, 1.0, "too far")];
        assert_eq!(pick_narration(&segments, 10_000, 3_000), None);
    }

    #[test]
    fn each_entry_gets_the_most_recent_frame_not_after_it() {
        let mut frames = FrameMap::default();
        frames.insert(0, "frame-000000.png".to_string());
        frames.insert(1_000, "frame-001000.png".to_string());

        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let events = vec![TimestampedEvent {
            at: start,
            relative_ms: 500,
            event: RecordingEvent::Click { button: "left".to_string(), x: 1, y: 2 },
        }];

        let manifest = build_manifest(
            "s1".to_string(),
            "desc".to_string(),
            start,
            start,
            &events,
            &frames,
            &[],
            None,
            3_000,
        );
        assert_eq!(manifest.entries[0].frame.as_deref(), Some("frame-000000.png"));
    }
}
