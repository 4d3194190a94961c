use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::RunnerError;
use crate::model::{bound_stdout, SpawnOutput, SpawnRequest};

/// Spawns OS processes with a timeout and captured, byte-bounded output.
/// Never raises on a non-zero exit code — that is reported as-is in
/// [`SpawnOutput::exit_code`] (spec.md §4.C1).
#[derive(Clone, Copy, Debug, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self, request: SpawnRequest) -> Result<SpawnOutput, RunnerError> {
        debug!(program = %request.program, args = ?request.args, "spawning subprocess");

        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(if request.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|err| RunnerError::SpawnFailed(err.to_string()))?;

        if let Some(stdin_bytes) = request.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                if let Err(err) = stdin.write_all(&stdin_bytes).await {
                    warn!(error = %err, "failed writing stdin to subprocess");
                }
            }
        }

        let wait = tokio::time::timeout(request.timeout, child.wait_with_output());
        match wait.await {
            Ok(Ok(output)) => {
                let (stdout, stdout_truncated) =
                    bound_stdout(output.stdout, request.max_output_bytes);
                let (stderr, stderr_truncated) =
                    bound_stdout(output.stderr, request.max_output_bytes);
                Ok(SpawnOutput {
                    stdout,
                    stderr,
                    exit_code: output.status.code(),
                    stdout_truncated,
                    stderr_truncated,
                })
            }
            Ok(Err(err)) => Err(RunnerError::Io(err.to_string())),
            Err(_elapsed) => Err(RunnerError::Timeout(request.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn captures_stdout_and_nonzero_exit_without_raising() {
        let runner = SubprocessRunner::new();
        let request = SpawnRequest::new("sh", vec!["-c".into(), "echo hi; exit 3".into()]);
        let output = runner.run(request).await.unwrap();
        assert_eq!(output.stdout_string().trim(), "hi");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
    }

    #[tokio::test]
    async fn times_out_long_running_process() {
        let runner = SubprocessRunner::new();
        let request = SpawnRequest::new("sh", vec!["-c".into(), "sleep 5".into()])
            .with_timeout(Duration::from_millis(50));
        let err = runner.run(request).await.unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(_)));
    }

    #[tokio::test]
    async fn truncates_output_past_the_byte_cap() {
        let runner = SubprocessRunner::new();
        let request = SpawnRequest::new("sh", vec!["-c".into(), "yes | head -c 100000".into()])
            .with_max_output_bytes(10);
        let output = runner.run(request).await.unwrap();
        assert_eq!(output.stdout.len(), 10);
        assert!(output.stdout_truncated);
    }
}
