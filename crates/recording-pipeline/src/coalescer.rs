//! Keystroke coalescing (spec.md §4.C11, S3): consecutive `keypress` events
//! fold into one `typing` burst. The burst closes 500 ms after the last
//! keypress, on any non-keypress input event, or on stop — closing is the
//! caller's responsibility (it owns the clock); this module only tracks
//! burst state and renders the final event.

use core_types::RecordingEvent;

struct PendingBurst {
    text: String,
    key_count: u32,
    start_ms: u64,
    last_ms: u64,
}

#[derive(Default)]
pub struct Coalescer {
    pending: Option<PendingBurst>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The last keypress timestamp in the open burst, if any — callers use
    /// this plus the coalesce window to schedule the idle-timeout flush.
    pub fn last_activity_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|b| b.last_ms)
    }

    /// Folds one keypress into the current burst, starting a new one if
    /// none is open. Only single-character keys contribute to `text`;
    /// named keys (e.g. "Enter", "Tab") still count toward `key_count`.
    pub fn push_keypress(&mut self, key: &str, at_ms: u64) {
        let printable = is_printable(key);
        match &mut self.pending {
            Some(burst) => {
                burst.key_count += 1;
                burst.last_ms = at_ms;
                if printable {
                    burst.text.push_str(key);
                }
            }
            None => {
                let mut text = String::new();
                if printable {
                    text.push_str(key);
                }
                self.pending = Some(PendingBurst {
                    text,
                    key_count: 1,
                    start_ms: at_ms,
                    last_ms: at_ms,
                });
            }
        }
    }

    /// Closes the burst (idle timeout, a non-keypress event, a hotkey, or
    /// stop) and renders it as a [`RecordingEvent::Typing`]. `end_ms` is the
    /// moment the close happens, not necessarily the last keypress's time —
    /// for an idle-timeout close that is `last keypress + coalesce window`.
    pub fn flush(&mut self, end_ms: u64) -> Option<RecordingEvent> {
        self.pending.take().map(|burst| RecordingEvent::Typing {
            text: burst.text,
            key_count: burst.key_count,
            start_ms: burst.start_ms,
            end_ms,
        })
    }
}

fn is_printable(key: &str) -> bool {
    key.chars().count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_three_printable_keypresses_into_one_burst() {
        let mut coalescer = Coalescer::new();
        coalescer.push_keypress("h", 0);
        coalescer.push_keypress("i", 50);
        coalescer.push_keypress("!", 120);
        let event = coalescer.flush(120 + 500).unwrap();
        match event {
            RecordingEvent::Typing {
                text,
                key_count,
                start_ms,
                end_ms,
            } => {
                assert_eq!(text, "hi!");
                assert_eq!(key_count, 3);
                assert_eq!(start_ms, 0);
                assert_eq!(end_ms, 620);
            }
            other => panic!("expected a typing event, got {other:?}"),
        }
    }

    #[test]
    fn named_keys_count_but_do_not_contribute_text() {
        let mut coalescer = Coalescer::new();
        coalescer.push_keypress("a", 0);
        coalescer.push_keypress("Enter", 10);
        coalescer.push_keypress("b", 20);
        let event = coalescer.flush(30).unwrap();
        match event {
            RecordingEvent::Typing { text, key_count, .. } => {
                assert_eq!(text, "ab");
                assert_eq!(key_count, 3);
            }
            other => panic!("expected a typing event, got {other:?}"),
        }
    }

    #[test]
    fn flushing_an_empty_coalescer_yields_nothing() {
        let mut coalescer = Coalescer::new();
        assert!(coalescer.flush(100).is_none());
    }

    #[test]
    fn a_second_burst_after_a_flush_starts_fresh() {
        let mut coalescer = Coalescer::new();
        coalescer.push_keypress("a", 0);
        coalescer.flush(10);
        coalescer.push_keypress("b", 20);
        let event = coalescer.flush(30).unwrap();
        match event {
            RecordingEvent::Typing { text, start_ms, .. } => {
                assert_eq!(text, "b");
                assert_eq!(start_ms, 20);
            }
            other => panic!("expected a typing event, got {other:?}"),
        }
    }
}
