use thiserror::Error;

/// Only the screenshot step is load-bearing enough to fail a whole
/// observation (spec.md §4.C8: "vision screenshot always attempted"); every
/// other step degrades to an empty/`None` field instead of raising.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("screenshot capture failed: {0}")]
    ScreenshotFailed(String),
}
