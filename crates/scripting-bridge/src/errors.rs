use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BridgeError {
    #[error("permission denied: grant Accessibility / Automation access to this agent in System Settings and retry")]
    PermissionDenied,

    #[error("application not found: {0}")]
    AppNotFound(String),

    #[error("script failed: {0}")]
    ScriptFailed(String),

    #[error("script timed out")]
    Timeout,

    #[error("io error writing script: {0}")]
    Io(String),
}
