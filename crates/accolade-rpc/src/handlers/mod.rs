// crates/accolade-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group.

pub mod endorsement;
pub mod node;
pub mod rank;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use accolade_core::{LedgerError, LedgerStore};
use accolade_ledger::EndorsementLedger;

/// A handler failure as it appears on the wire: a stable code plus a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

impl RpcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new("invalid_input", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal", message)
    }
}

impl From<LedgerError> for RpcError {
    fn from(err: LedgerError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Run a ledger call on the blocking pool.
///
/// Ledger operations are synchronous (they may sleep between retries), so
/// they must stay off the async worker threads.
pub(crate) async fn run_blocking<S, T, F>(
    ledger: &Arc<EndorsementLedger<S>>,
    op: F,
) -> Result<T, RpcError>
where
    S: LedgerStore + 'static,
    T: Send + 'static,
    F: FnOnce(&EndorsementLedger<S>) -> Result<T, LedgerError> + Send + 'static,
{
    let ledger = ledger.clone();
    tokio::task::spawn_blocking(move || op(&ledger))
        .await
        .map_err(|e| RpcError::internal(format!("ledger task failed: {}", e)))?
        .map_err(RpcError::from)
}
