// crates/accolade-rpc/src/handlers/node.rs
//
// Node health handler: GetHealth.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::RpcError;

/// Request for node health status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetHealthRequest {}

/// Response containing node health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHealthResponse {
    /// Always "healthy" while the server answers.
    pub status: String,
    /// Ledger Store backend name ("rocksdb" or "memory").
    pub storage: String,
    pub uptime_secs: u64,
}

/// Handle a GetHealth request.
pub async fn handle_get_health(
    _request: GetHealthRequest,
    storage: &str,
    start_time: Instant,
) -> Result<GetHealthResponse, RpcError> {
    Ok(GetHealthResponse {
        status: "healthy".to_string(),
        storage: storage.to_string(),
        uptime_secs: start_time.elapsed().as_secs(),
    })
}
