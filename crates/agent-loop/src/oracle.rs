use async_trait::async_trait;
use oracle_protocol::OracleMessage;

use crate::errors::OracleError;

/// The external reasoning oracle (spec.md §1: "only the message structure it
/// receives and the response grammar it must honor are specified" — the
/// oracle itself stays out of scope). Concrete implementations live at the
/// binary edge, wrapping whatever transport reaches the remote model.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn ask(&self, system_prompt: &str, history: &[OracleMessage]) -> Result<String, OracleError>;
}
