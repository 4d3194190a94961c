use std::collections::VecDeque;

use crate::model::ActionRecord;

/// Fixed-size ring buffer of recent actions, last-writer-wins once full
/// (spec.md §5 "Shared resources").
pub struct ActionRing {
    capacity: usize,
    entries: VecDeque<ActionRecord>,
}

impl ActionRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: ActionRecord) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    pub fn recent(&self, max: usize) -> Vec<ActionRecord> {
        self.entries.iter().rev().take(max).rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32) -> ActionRecord {
        ActionRecord {
            action: format!("action-{n}"),
            ok: true,
            summary: String::new(),
        }
    }

    #[test]
    fn drops_oldest_once_capacity_is_reached() {
        let mut ring = ActionRing::new(3);
        for n in 0..5 {
            ring.push(record(n));
        }
        let recent = ring.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].action, "action-2");
        assert_eq!(recent[2].action, "action-4");
    }

    #[test]
    fn recent_caps_at_requested_count() {
        let mut ring = ActionRing::new(10);
        for n in 0..10 {
            ring.push(record(n));
        }
        let recent = ring.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[4].action, "action-9");
    }
}
