//! Parses the oracle's raw reply into a [`ParsedResponse`] (spec.md §4.C9).
//! Total: every input string yields a tagged variant, never a panic
//! (spec.md §8 property 5).

use core_types::{Command, ParsedResponse};
use serde_json::Value;

/// Parse `raw` into a [`ParsedResponse`], assigning `agent_<counter>` as the
/// id of any resulting action command.
pub fn parse_response(raw: &str, counter: u64) -> ParsedResponse {
    let candidate = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(candidate.trim()) {
        Ok(v) => v,
        Err(err) => return ParsedResponse::error(format!("invalid JSON: {err}"), raw.to_string()),
    };

    let Some(obj) = value.as_object() else {
        return ParsedResponse::error("reply is not a JSON object", raw.to_string());
    };

    let thinking = obj
        .get("thinking")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if let Some(status) = obj.get("status").and_then(Value::as_str) {
        return match status {
            "complete" => ParsedResponse::Complete {
                thinking,
                summary: obj
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "needs_help" => ParsedResponse::NeedsHelp {
                thinking,
                question: obj
                    .get("question")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "error" => ParsedResponse::Error {
                error: obj
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unspecified oracle error")
                    .to_string(),
                raw_response: raw.to_string(),
            },
            other => ParsedResponse::error(format!("unknown status \"{other}\""), raw.to_string()),
        };
    }

    let Some(action_obj) = obj.get("action").and_then(Value::as_object) else {
        return ParsedResponse::error(
            "reply has neither a recognized \"status\" nor an \"action\" object",
            raw.to_string(),
        );
    };

    let layer = match action_obj.get("layer").and_then(Value::as_str) {
        Some(layer) if !layer.is_empty() => layer.to_string(),
        _ => return ParsedResponse::error("\"action.layer\" missing or empty", raw.to_string()),
    };
    let action_name = match action_obj.get("action").and_then(Value::as_str) {
        Some(action) if !action.is_empty() => action.to_string(),
        _ => return ParsedResponse::error("\"action.action\" missing or empty", raw.to_string()),
    };
    let params = action_obj
        .get("params")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let command = Command {
        kind: core_types::CommandKind::Command,
        id: format!("agent_{counter}"),
        layer,
        action: action_name,
        params,
    };

    ParsedResponse::Action { thinking, command }
}

/// Strips a single leading/trailing ``` or ```json fence, if present. Plain
/// JSON with no fence passes through unchanged.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let after_lang = after_open.strip_prefix("json").unwrap_or(after_open);
    let body = after_lang.trim_start_matches(['\r', '\n']);
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_action_reply() {
        let raw = r#"{"thinking":"click submit","action":{"layer":"browser","action":"click","params":{"ref":"e1"}}}"#;
        match parse_response(raw, 7) {
            ParsedResponse::Action { command, .. } => {
                assert_eq!(command.id, "agent_7");
                assert_eq!(command.layer, "browser");
                assert_eq!(command.action, "click");
            }
            other => panic!("expected an action, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_complete_reply() {
        let raw = r#"{"thinking":"done","status":"complete","summary":"saved the file"}"#;
        match parse_response(raw, 1) {
            ParsedResponse::Complete { summary, .. } => assert_eq!(summary, "saved the file"),
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_needs_help_reply() {
        let raw = r#"{"thinking":"stuck","status":"needs_help","question":"which file?"}"#;
        match parse_response(raw, 1) {
            ParsedResponse::NeedsHelp { question, .. } => assert_eq!(question, "which file?"),
            other => panic!("expected needs_help, got {other:?}"),
        }
    }

    #[test]
    fn strips_markdown_fences_with_json_language_tag() {
        let raw = "```json\n{\"thinking\":\"x\",\"status\":\"complete\",\"summary\":\"ok\"}\n```";
        match parse_response(raw, 1) {
            ParsedResponse::Complete { summary, .. } => assert_eq!(summary, "ok"),
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[test]
    fn strips_bare_markdown_fences() {
        let raw = "```\n{\"thinking\":\"x\",\"status\":\"complete\",\"summary\":\"ok\"}\n```";
        match parse_response(raw, 1) {
            ParsedResponse::Complete { summary, .. } => assert_eq!(summary, "ok"),
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_never_panics_and_yields_error_variant() {
        let raw = "not json at all {{{";
        match parse_response(raw, 1) {
            ParsedResponse::Error { raw_response, .. } => assert_eq!(raw_response, raw),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn missing_action_fields_yield_error_not_panic() {
        let raw = r#"{"thinking":"x","action":{"layer":"browser"}}"#;
        assert!(matches!(parse_response(raw, 1), ParsedResponse::Error { .. }));
    }

    #[test]
    fn empty_string_never_panics() {
        assert!(matches!(parse_response("", 1), ParsedResponse::Error { .. }));
    }
}
