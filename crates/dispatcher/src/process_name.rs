//! Resolves a display app name to its OS process name, since the two can
//! diverge (e.g. "Visual Studio Code" vs. process "Code"). Grounded in
//! `app_control.rs`'s `resolve_process_name`: exact case-insensitive match
//! first, then a bidirectional substring match.
//!
//! Supplements spec.md §4.C2/C5/C6, whose scripting actions all key off an
//! app name, with the fuzzy resolution those components need to be
//! reliable (SPEC_FULL.md §3 point 2).

pub fn resolve<'a>(requested: &str, known_processes: &'a [String]) -> Option<&'a str> {
    if let Some(exact) = known_processes
        .iter()
        .find(|p| p.eq_ignore_ascii_case(requested))
    {
        return Some(exact.as_str());
    }

    let lower_requested = requested.to_lowercase();
    known_processes
        .iter()
        .find(|p| {
            let lower_proc = p.to_lowercase();
            lower_proc.contains(&lower_requested) || lower_requested.contains(&lower_proc)
        })
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_case_insensitive_match_wins() {
        let procs = vec!["Code".to_string(), "Finder".to_string()];
        assert_eq!(resolve("code", &procs), Some("Code"));
    }

    #[test]
    fn falls_back_to_bidirectional_substring_match() {
        let procs = vec!["Visual Studio Code".to_string()];
        assert_eq!(resolve("Code", &procs), Some("Visual Studio Code"));
    }

    #[test]
    fn no_match_returns_none() {
        let procs = vec!["Finder".to_string()];
        assert_eq!(resolve("Terminal", &procs), None);
    }
}
