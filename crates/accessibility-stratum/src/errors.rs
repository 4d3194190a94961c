use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AxError {
    #[error("unknown reference: {0}")]
    UnknownRef(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("application not found: {0}")]
    AppNotFound(String),

    #[error("accessibility script failed: {0}")]
    ScriptFailed(String),

    #[error("accessibility script timed out")]
    Timeout,

    #[error("element at flat index {0} no longer present")]
    StaleElement(usize),
}
