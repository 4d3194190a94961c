//! Screenshot-trigger bookkeeping (spec.md §4.C11, §8 "Boundary
//! behaviours"): scroll accumulation, the heartbeat, and frame debounce.
//! Each is a pure state machine driven by caller-supplied timestamps so it
//! can be tested without real timers.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerReason {
    ScrollThreshold,
    Heartbeat,
}

/// Accumulates absolute `|deltaY|`; fires and resets once the running total
/// reaches the threshold.
pub struct ScrollAccumulator {
    threshold: f64,
    accumulated: f64,
}

impl ScrollAccumulator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            accumulated: 0.0,
        }
    }

    /// Returns `true` exactly when this push crosses the threshold, having
    /// already reset the accumulator to 0.
    pub fn push(&mut self, delta_y: f64) -> bool {
        self.accumulated += delta_y.abs();
        if self.accumulated >= self.threshold {
            self.accumulated = 0.0;
            true
        } else {
            false
        }
    }
}

/// Fires whenever `interval` elapses with no other trigger having fired.
/// `note_activity` restarts the window without itself firing; `due` checks
/// without mutating.
pub struct Heartbeat {
    interval_ms: u64,
    last_trigger_ms: u64,
}

impl Heartbeat {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_trigger_ms: 0,
        }
    }

    pub fn note_activity(&mut self, at_ms: u64) {
        self.last_trigger_ms = at_ms;
    }

    pub fn due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_trigger_ms) >= self.interval_ms
    }

    pub fn next_deadline_ms(&self) -> u64 {
        self.last_trigger_ms + self.interval_ms
    }
}

/// Drops any capture arriving less than `window` after the previous one.
pub struct FrameDebounce {
    window_ms: u64,
    last_capture_ms: Option<u64>,
}

impl FrameDebounce {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_capture_ms: None,
        }
    }

    /// Returns `true` if a capture at `at_ms` should proceed.
    pub fn allow(&mut self, at_ms: u64) -> bool {
        if let Some(last) = self.last_capture_ms {
            if at_ms.saturating_sub(last) < self.window_ms {
                return false;
            }
        }
        self.last_capture_ms = Some(at_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_fires_once_threshold_is_reached_and_resets() {
        let mut acc = ScrollAccumulator::new(500.0);
        assert!(!acc.push(-200.0));
        assert!(!acc.push(150.0));
        assert!(acc.push(200.0));
        assert!(!acc.push(100.0));
    }

    #[test]
    fn heartbeat_fires_at_five_seconds_of_quiescence() {
        let mut hb = Heartbeat::new(5_000);
        assert!(!hb.due(4_999));
        assert!(hb.due(5_000));
    }

    #[test]
    fn an_event_at_4900ms_restarts_the_heartbeat_window() {
        let mut hb = Heartbeat::new(5_000);
        hb.note_activity(4_900);
        assert!(!hb.due(9_800));
        assert!(hb.due(9_900));
    }

    #[test]
    fn frame_debounce_drops_captures_inside_the_window() {
        let mut debounce = FrameDebounce::new(300);
        assert!(debounce.allow(0));
        assert!(!debounce.allow(299));
        assert!(debounce.allow(300));
    }
}
