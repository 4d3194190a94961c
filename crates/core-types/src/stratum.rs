//! The common execution-stratum interface (spec.md §9 "Stratum
//! polymorphism"). Lets the dispatcher be a flat table lookup over
//! trait objects instead of a virtual class hierarchy.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StratumErrorKind;

/// One execution stratum (shell, browser, accessibility, vision). Each
/// implementor owns its own action set and never lets an error escape as a
/// panic or an unhandled `Result::Err` that isn't this error type — the
/// dispatcher is the only place untyped faults get wrapped (spec.md §4.C7).
#[async_trait]
pub trait Stratum: Send + Sync {
    /// Execute `action` with `params`, returning the `data` map for a
    /// successful result envelope, or a typed error.
    async fn handle(&self, action: &str, params: &Map<String, Value>) -> Result<Map<String, Value>, StratumErrorKind>;
}

/// Typed extraction helpers shared by every stratum's param validation
/// (spec.md §9 "Dynamic params → typed extraction").
pub fn require_str<'a>(params: &'a Map<String, Value>, key: &str, action: &str) -> Result<&'a str, StratumErrorKind> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            StratumErrorKind::Validation(format!("Missing \"{key}\" parameter for {action}"))
        })
}

pub fn optional_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

pub fn optional_u64(params: &Map<String, Value>, key: &str) -> Option<u64> {
    params.get(key).and_then(Value::as_u64)
}

pub fn optional_i64(params: &Map<String, Value>, key: &str) -> Option<i64> {
    params.get(key).and_then(Value::as_i64)
}

pub fn optional_bool(params: &Map<String, Value>, key: &str) -> Option<bool> {
    params.get(key).and_then(Value::as_bool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_reports_missing_param_like_spec_s1() {
        let params = Map::new();
        let err = require_str(&params, "command", "shell exec").unwrap_err();
        match err {
            StratumErrorKind::Validation(msg) => {
                assert_eq!(msg, "Missing \"command\" parameter for shell exec");
            }
            _ => panic!("expected a validation error"),
        }
    }
}
