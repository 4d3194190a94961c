//! Coordinate and keyboard actions, injected via `cliclick` (mouse) and the
//! OS-scripting bridge's `System Events` keystroke/key-code commands
//! (keyboard), grounded in the pack's `cliclick`/`keystroke` AppleScript
//! idiom for raw coordinate input that JXA has no first-class API for.

use std::time::Duration;

use scripting_bridge::{js_literal, ScriptingBridge};
use subprocess_runner::{SpawnRequest, SubprocessRunner};

use crate::capture;
use crate::errors::VisionError;
use crate::keycombo::{self, KeyTarget};

const CLICLICK_TIMEOUT: Duration = Duration::from_secs(5);

async fn run_cliclick(runner: &SubprocessRunner, args: Vec<String>) -> Result<(), VisionError> {
    let request = SpawnRequest::new("cliclick", args).with_timeout(CLICLICK_TIMEOUT);
    let output = runner
        .run(request)
        .await
        .map_err(|err| VisionError::CaptureFailed(err.to_string()))?;
    if !output.success() {
        return Err(VisionError::CaptureFailed(output.stderr_string()));
    }
    Ok(())
}

pub async fn click(runner: &SubprocessRunner, x: i32, y: i32) -> Result<(), VisionError> {
    run_cliclick(runner, vec![format!("c:{x},{y}")]).await
}

pub async fn double_click(runner: &SubprocessRunner, x: i32, y: i32) -> Result<(), VisionError> {
    run_cliclick(runner, vec![format!("dc:{x},{y}")]).await
}

pub async fn right_click(runner: &SubprocessRunner, x: i32, y: i32) -> Result<(), VisionError> {
    run_cliclick(runner, vec![format!("rc:{x},{y}")]).await
}

pub async fn drag(
    runner: &SubprocessRunner,
    from_x: i32,
    from_y: i32,
    to_x: i32,
    to_y: i32,
) -> Result<(), VisionError> {
    run_cliclick(
        runner,
        vec![format!("dd:{from_x},{from_y}"), format!("du:{to_x},{to_y}")],
    )
    .await
}

pub async fn scroll(runner: &SubprocessRunner, x: i32, y: i32, delta_y: f64) -> Result<(), VisionError> {
    let steps = (delta_y / 10.0).round() as i32;
    run_cliclick(runner, vec![format!("m:{x},{y}"), format!("w:{steps}")]).await
}

pub async fn type_text(bridge: &ScriptingBridge, text: &str) -> Result<(), VisionError> {
    let script = format!(
        r#"Application("System Events").keystroke({text});"#,
        text = js_literal(text),
    );
    bridge.run_raw(&script).await.map_err(capture::map_bridge_error)?;
    Ok(())
}

pub async fn key_combo(bridge: &ScriptingBridge, combo: &str) -> Result<(), VisionError> {
    let parsed = keycombo::parse(combo)?;
    let using_clause = if parsed.modifiers.is_empty() {
        String::new()
    } else {
        let tokens = parsed
            .modifiers
            .iter()
            .map(|m| format!("\"{}\"", m.as_using_token()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(", {{using: [{tokens}]}}")
    };

    let script = match parsed.target {
        KeyTarget::Keystroke(ref key) => format!(
            r#"Application("System Events").keystroke({key}{using});"#,
            key = js_literal(key),
            using = using_clause,
        ),
        KeyTarget::KeyCode(code) => format!(
            r#"Application("System Events").keyCode({code}{using});"#,
            code = code,
            using = using_clause,
        ),
    };

    bridge.run_raw(&script).await.map_err(capture::map_bridge_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::keycombo::parse;

    #[test]
    fn parse_is_reachable_from_actions_module() {
        assert!(parse("cmd+p").is_ok());
    }
}
