use std::time::Duration;

/// What to spawn. Mirrors a plain `execve(2)` argv — no shell interpolation
/// happens here, callers that need shell semantics (the shell stratum) pass
/// the interpreter explicitly as `program`.
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl SpawnRequest {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: None,
            timeout: Duration::from_secs(30),
            max_output_bytes: 1 << 20,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stdin(mut self, stdin: Vec<u8>) -> Self {
        self.stdin = Some(stdin);
        self
    }

    pub fn with_max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }
}

/// Outcome of a spawned process. Never constructed to represent a timeout —
/// that is reported as a distinct [`crate::errors::RunnerError::Timeout`].
#[derive(Clone, Debug)]
pub struct SpawnOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
}

impl SpawnOutput {
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

fn bound(buf: Vec<u8>, max: usize) -> (Vec<u8>, bool) {
    if buf.len() > max {
        let mut buf = buf;
        buf.truncate(max);
        (buf, true)
    } else {
        (buf, false)
    }
}

pub(crate) fn bound_stdout(buf: Vec<u8>, max: usize) -> (Vec<u8>, bool) {
    bound(buf, max)
}
