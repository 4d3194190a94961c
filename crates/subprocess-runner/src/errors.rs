use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RunnerError {
    #[error("process spawn failed: {0}")]
    SpawnFailed(String),

    #[error("process timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("io error communicating with process: {0}")]
    Io(String),
}
