//! The error taxonomy surfaced in result envelopes' `data.error` (spec.md §7).

use serde::Serialize;
use thiserror::Error;

/// Common error kinds every stratum maps its own error enum onto at the
/// dispatcher boundary. Crate-local errors stay strongly typed within their
/// crate; this is only the shape the dispatcher needs to build a result
/// envelope and to decide recoverability for the agent loop.
#[derive(Clone, Debug, Error, Serialize)]
pub enum StratumErrorKind {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown reference: {0}")]
    UnknownRef(String),
    #[error("stale snapshot: {0}")]
    StaleSnapshot(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("app not found: {0}")]
    AppNotFound(String),
    #[error("script failed: {0}")]
    ScriptFailed(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("observation failure: {0}")]
    ObservationFailure(String),
    #[error("oracle failure: {0}")]
    OracleFailure(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl StratumErrorKind {
    /// Whether the agent loop may feed this error back to the oracle as
    /// context rather than terminating (spec.md §5 "Cancellation and
    /// timeouts", §7 propagation policy).
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            StratumErrorKind::ObservationFailure(_) | StratumErrorKind::OracleFailure(_)
        )
    }

    /// Human-facing message for `data.error`, with the "take a new
    /// snapshot" hint spec.md §3 requires for stale/unknown refs.
    pub fn message(&self) -> String {
        match self {
            StratumErrorKind::UnknownRef(r) => {
                format!("Unknown reference \"{r}\" — take a new snapshot")
            }
            StratumErrorKind::StaleSnapshot(r) => {
                format!("Stale snapshot for \"{r}\" — take a new snapshot")
            }
            other => other.to_string(),
        }
    }
}
