use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BrowserError {
    #[error("navigation timed out: {0}")]
    NavTimeout(String),

    #[error("unknown reference: {0}")]
    UnknownRef(String),

    #[error("stale snapshot, page has navigated since: {0}")]
    StaleRoute(String),

    #[error("option not found: {0}")]
    OptionNotFound(String),

    #[error("browser not launched")]
    NotLaunched,

    #[error("cdp i/o error: {0}")]
    CdpIo(String),
}
