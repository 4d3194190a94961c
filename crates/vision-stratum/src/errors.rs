use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum VisionError {
    #[error("screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("capture timed out")]
    Timeout,

    #[error("application not found: {0}")]
    AppNotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid key combo \"{0}\": {1}")]
    InvalidKeyCombo(String, String),

    #[error("bridge script failed: {0}")]
    ScriptFailed(String),

    #[error("io error: {0}")]
    Io(String),
}
