use core_types::RecentAction;

/// Per-step inputs the agent loop supplies that the observer cannot derive
/// on its own: which stratum currently owns element data, and the rolling
/// recent-action history to embed (spec.md §3 Observation, §4.C8).
#[derive(Clone, Debug, Default)]
pub struct ObserveInputs {
    /// Set when the agent loop has an open browser context (toggled by
    /// `browser.launch`/`browser.close` commands it dispatched) — mirrors
    /// spec.md §4.C10's "browser-active flag".
    pub browser_active: bool,
    /// Newest last; only the last 5 are embedded in the resulting
    /// [`core_types::Observation`].
    pub recent_actions: Vec<RecentAction>,
}

pub(crate) fn last_five(mut actions: Vec<RecentAction>) -> Vec<RecentAction> {
    if actions.len() > 5 {
        let drop = actions.len() - 5;
        actions.drain(0..drop);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(n: usize) -> RecentAction {
        RecentAction {
            action_id: n.to_string(),
            layer: "shell".to_string(),
            action: "exec".to_string(),
            ok: true,
            summary: String::new(),
        }
    }

    #[test]
    fn keeps_only_the_newest_five() {
        let all: Vec<RecentAction> = (0..8).map(action).collect();
        let kept = last_five(all);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept.first().unwrap().action_id, "3");
        assert_eq!(kept.last().unwrap().action_id, "7");
    }

    #[test]
    fn passes_through_when_five_or_fewer() {
        let all: Vec<RecentAction> = (0..3).map(action).collect();
        assert_eq!(last_five(all).len(), 3);
    }
}
