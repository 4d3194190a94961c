use thiserror::Error;

/// Failure calling the external reasoning oracle — always terminal for the
/// loop (spec.md §7 "OracleFailure ... Terminal for the loop").
#[derive(Debug, Error, Clone)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(String),
    #[error("oracle returned an empty reply")]
    Empty,
}
