use std::time::Duration;

use core_types::StratumErrorKind;
use scripting_bridge::{js_literal, BridgeError, ScriptingBridge};
use serde_json::{json, Value};
use subprocess_runner::{SpawnRequest, SubprocessRunner};
use tracing::info;

pub async fn exec(
    runner: &SubprocessRunner,
    command: &str,
    timeout: Duration,
) -> Result<Value, StratumErrorKind> {
    info!(command, "shell: exec");
    let request = SpawnRequest::new("sh", vec!["-c".to_string(), command.to_string()])
        .with_timeout(timeout);
    let output = runner
        .run(request)
        .await
        .map_err(|err| StratumErrorKind::Timeout(err.to_string()))?;

    Ok(json!({
        "stdout": output.stdout_string(),
        "stderr": output.stderr_string(),
        "exitCode": output.exit_code,
        "stdoutTruncated": output.stdout_truncated,
        "stderrTruncated": output.stderr_truncated,
    }))
}

pub async fn launch_app(runner: &SubprocessRunner, app: &str) -> Result<Value, StratumErrorKind> {
    info!(app, "shell: launch_app");
    let request = SpawnRequest::new("open", vec!["-a".to_string(), app.to_string()])
        .with_timeout(Duration::from_secs(10));
    let output = runner
        .run(request)
        .await
        .map_err(|err| StratumErrorKind::Timeout(err.to_string()))?;
    if !output.success() {
        return Err(StratumErrorKind::AppNotFound(format!(
            "could not launch \"{app}\": {}",
            output.stderr_string().trim()
        )));
    }
    Ok(json!({ "app": app, "launched": true }))
}

pub async fn switch_app(bridge: &ScriptingBridge, app: &str) -> Result<Value, StratumErrorKind> {
    info!(app, "shell: switch_app");
    let script = format!(
        "Application({app}).activate(); JSON.stringify({{activated: true}});",
        app = js_literal(app)
    );
    run_bridge(bridge, &script).await?;
    Ok(json!({ "app": app, "switched": true }))
}

pub async fn close_app(bridge: &ScriptingBridge, app: &str) -> Result<Value, StratumErrorKind> {
    info!(app, "shell: close_app");
    let script = format!(
        "Application({app}).quit(); JSON.stringify({{closed: true}});",
        app = js_literal(app)
    );
    run_bridge(bridge, &script).await?;
    Ok(json!({ "app": app, "closed": true }))
}

pub async fn minimize_window(
    bridge: &ScriptingBridge,
    app: &str,
) -> Result<Value, StratumErrorKind> {
    info!(app, "shell: minimize_window");
    let activate = format!(
        "Application({app}).activate(); JSON.stringify({{activated: true}});",
        app = js_literal(app)
    );
    run_bridge(bridge, &activate).await?;

    let minimize = r#"
        var se = Application("System Events");
        se.keystroke("m", {using: "command down"});
        JSON.stringify({minimized: true});
    "#;
    run_bridge(bridge, minimize).await?;
    Ok(json!({ "app": app, "minimized": true }))
}

pub async fn list_apps(bridge: &ScriptingBridge) -> Result<Value, StratumErrorKind> {
    let script = r#"
        var se = Application("System Events");
        var names = se.processes.whose({visible: true}).name();
        JSON.stringify({apps: names});
    "#;
    let value = run_bridge(bridge, script).await?;
    Ok(value)
}

pub async fn get_frontmost(bridge: &ScriptingBridge) -> Result<Value, StratumErrorKind> {
    let script = r#"
        var se = Application("System Events");
        var front = se.processes.whose({frontmost: true})[0];
        JSON.stringify({app: front ? front.name() : null});
    "#;
    run_bridge(bridge, script).await
}

async fn run_bridge(bridge: &ScriptingBridge, script: &str) -> Result<Value, StratumErrorKind> {
    bridge.run_json(script).await.map_err(map_bridge_error)
}

fn map_bridge_error(err: BridgeError) -> StratumErrorKind {
    match err {
        BridgeError::PermissionDenied => {
            StratumErrorKind::PermissionDenied(err.to_string())
        }
        BridgeError::AppNotFound(msg) => StratumErrorKind::AppNotFound(msg),
        BridgeError::Timeout => StratumErrorKind::Timeout("scripting bridge".to_string()),
        BridgeError::ScriptFailed(msg) => StratumErrorKind::ScriptFailed(msg),
        BridgeError::Io(msg) => StratumErrorKind::Internal(msg),
    }
}
