// crates/accolade-rpc/src/handlers/rank.rs
//
// Ranking handler: Results.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use accolade_core::{Domain, LedgerStore, RankEntry, RankQuery};
use accolade_ledger::EndorsementLedger;

use super::{run_blocking, RpcError};

/// Request for the ranked results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsRequest {
    pub domain: Option<Domain>,
    /// RFC 3339 lower bound on edge creation time, inclusive.
    pub since: Option<DateTime<Utc>>,
    /// Defaults to the configured rank limit. Must be positive.
    pub limit: Option<i64>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub results: Vec<RankEntry>,
}

/// Handle a Results request.
pub async fn handle_results<S: LedgerStore + 'static>(
    ledger: &Arc<EndorsementLedger<S>>,
    request: ResultsRequest,
) -> Result<ResultsResponse, RpcError> {
    let query = RankQuery {
        domain: request.domain,
        since: request.since,
        limit: request.limit,
    };
    let timeout_ms = request.timeout_ms;
    let results = run_blocking(ledger, move |l| {
        let deadline = l.config().deadline(timeout_ms);
        l.rank(&query, deadline)
    })
    .await?;
    Ok(ResultsResponse { results })
}
