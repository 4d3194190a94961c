//! Post-action feedback text appended to conversation history (spec.md
//! §4.C10 step 4): full shell stdout truncated head+tail for `exec`, a
//! brief status line for other shell actions, and nothing for every other
//! layer — the next screenshot carries the feedback there.

use core_types::ResultEnvelope;
use serde_json::Value;

const HALF_WINDOW_BYTES: usize = 4096;

pub fn feedback_message(layer: &str, action: &str, result: &ResultEnvelope) -> Option<String> {
    if layer != "shell" {
        return None;
    }

    if action == "exec" {
        let stdout = result.data.get("stdout").and_then(Value::as_str).unwrap_or_default();
        let status = if result.is_success() { "success" } else { "error" };
        Some(format!(
            "shell.exec ({status}):\n{}",
            truncate_head_tail(stdout, HALF_WINDOW_BYTES)
        ))
    } else {
        let status = if result.is_success() {
            "success".to_string()
        } else {
            result
                .data
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("error")
                .to_string()
        };
        Some(format!("shell.{action}: {status}"))
    }
}

/// Keeps the first and last `each` bytes (rounded to a UTF-8 char boundary)
/// verbatim and collapses the middle, so long command output stays bounded
/// without losing the part most likely to carry the result.
fn truncate_head_tail(s: &str, each: usize) -> String {
    if s.len() <= each * 2 {
        return s.to_string();
    }

    let head_end = floor_char_boundary(s, each);
    let tail_start = ceil_char_boundary(s, s.len() - each);
    let dropped = tail_start - head_end;

    format!(
        "{}\n... [{dropped} bytes truncated] ...\n{}",
        &s[..head_end],
        &s[tail_start..]
    )
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Status;
    use serde_json::json;

    fn result(status: Status, data: Value) -> ResultEnvelope {
        ResultEnvelope {
            kind: core_types::ResultKind::Result,
            id: "a1".to_string(),
            status,
            data: data.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn non_shell_layers_get_no_feedback_text() {
        let r = result(Status::Success, json!({ "action": "click" }));
        assert_eq!(feedback_message("browser", "click", &r), None);
    }

    #[test]
    fn other_shell_actions_get_a_brief_status() {
        let r = result(Status::Success, json!({}));
        let msg = feedback_message("shell", "launch_app", &r).unwrap();
        assert_eq!(msg, "shell.launch_app: success");
    }

    #[test]
    fn exec_embeds_full_stdout_when_short() {
        let r = result(Status::Success, json!({ "stdout": "hi\n" }));
        let msg = feedback_message("shell", "exec", &r).unwrap();
        assert!(msg.contains("hi"));
    }

    #[test]
    fn exec_truncates_long_stdout_preserving_head_and_tail() {
        let long = "a".repeat(10_000);
        let r = result(Status::Success, json!({ "stdout": long }));
        let msg = feedback_message("shell", "exec", &r).unwrap();
        assert!(msg.contains("truncated"));
        assert!(msg.starts_with("shell.exec (success):\naaaa"));
        assert!(msg.ends_with("aaaa"));
        assert!(msg.len() < long.len());
    }
}
