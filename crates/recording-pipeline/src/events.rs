//! Parses the native event-monitor helper's NDJSON stdout contract into
//! [`RawInputEvent`]s (spec.md §4.C11). The helper itself is out of scope —
//! only the line shape it emits is specified here.

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawInputEvent {
    Click {
        button: String,
        x: i32,
        y: i32,
    },
    Doubleclick {
        x: i32,
        y: i32,
    },
    Keypress {
        key: String,
    },
    Hotkey {
        keys: Vec<String>,
    },
    Scroll {
        x: i32,
        y: i32,
        #[serde(rename = "deltaY")]
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

impl RawInputEvent {
    pub fn is_keypress(&self) -> bool {
        matches!(self, RawInputEvent::Keypress { .. })
    }
}

#[derive(Debug, Error)]
#[error("malformed NDJSON event line: {0}")]
pub struct EventParseError(String);

pub fn parse_ndjson_line(line: &str) -> Result<RawInputEvent, EventParseError> {
    serde_json::from_str(line.trim()).map_err(|err| EventParseError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_keypress_line() {
        let event = parse_ndjson_line(r#"{"type":"keypress","key":"h"}"#).unwrap();
        assert!(matches!(event, RawInputEvent::Keypress { key } if key == "h"));
    }

    #[test]
    fn parses_a_scroll_line_with_camel_case_delta() {
        let event = parse_ndjson_line(r#"{"type":"scroll","x":10,"y":20,"deltaY":-120.5}"#).unwrap();
        match event {
            RawInputEvent::Scroll { delta_y, .. } => assert_eq!(delta_y, -120.5),
            other => panic!("expected a scroll event, got {other:?}"),
        }
    }

    #[test]
    fn rejects_an_unknown_event_type() {
        assert!(parse_ndjson_line(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn rejects_non_json_garbage() {
        assert!(parse_ndjson_line("not json at all").is_err());
    }
}
