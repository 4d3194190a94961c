use thiserror::Error;

/// Raised by [`crate::resolve::resolve_variables`] exactly when at least one
/// `{{name}}` token is left unresolved (spec.md §4.C12, §8 property 4) —
/// naming the complete set of missing variables, not just the first one.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum WorkflowError {
    #[error("unresolved workflow variables: {0}")]
    UnresolvedVariables(String),
}
