// crates/accolade-rpc/src/handlers/endorsement.rs
//
// Endorsement handlers: Submit, Remove, ByEndorser, ForRecipient, Influence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use accolade_core::{Domain, EndorsementView, LedgerError, LedgerStore, RecipientSummary, UserId};
use accolade_ledger::EndorsementLedger;

use super::{run_blocking, RpcError};

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Request to endorse `recipient_id` in `domain` on behalf of `endorser_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// The acting user, already authenticated upstream.
    pub endorser_id: UserId,
    pub recipient_id: UserId,
    pub domain: Domain,
    /// Overrides the configured deadline. Zero disables it.
    pub timeout_ms: Option<u64>,
}

/// Handle a Submit request.
pub async fn handle_submit<S: LedgerStore + 'static>(
    ledger: &Arc<EndorsementLedger<S>>,
    request: SubmitRequest,
) -> Result<EndorsementView, RpcError> {
    let edge = run_blocking(ledger, move |l| {
        let deadline = l.config().deadline(request.timeout_ms);
        l.submit(
            &request.endorser_id,
            &request.recipient_id,
            &request.domain,
            deadline,
        )
    })
    .await?;
    Ok(edge.view())
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

/// Request to withdraw endorsements. Without `recipient_id` every edge the
/// endorser holds in `domain` is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub endorser_id: UserId,
    pub domain: Domain,
    pub recipient_id: Option<UserId>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: bool,
}

/// Handle a Remove request. Removing nothing is reported as `not_found`.
pub async fn handle_remove<S: LedgerStore + 'static>(
    ledger: &Arc<EndorsementLedger<S>>,
    request: RemoveRequest,
) -> Result<RemoveResponse, RpcError> {
    let endorser = request.endorser_id.clone();
    let domain = request.domain.clone();
    let removed = run_blocking(ledger, move |l| {
        let deadline = l.config().deadline(request.timeout_ms);
        l.remove(
            &request.endorser_id,
            &request.domain,
            request.recipient_id.as_ref(),
            deadline,
        )
    })
    .await?;

    if !removed {
        return Err(LedgerError::NotFound(format!(
            "no endorsement by {} in {}",
            endorser, domain
        ))
        .into());
    }
    Ok(RemoveResponse { removed })
}

// ---------------------------------------------------------------------------
// ByEndorser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByEndorserRequest {
    pub endorser_id: UserId,
    pub domain: Option<Domain>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByEndorserResponse {
    pub endorsements: Vec<EndorsementView>,
}

/// Handle a ByEndorser request.
pub async fn handle_by_endorser<S: LedgerStore + 'static>(
    ledger: &Arc<EndorsementLedger<S>>,
    request: ByEndorserRequest,
) -> Result<ByEndorserResponse, RpcError> {
    let edges = run_blocking(ledger, move |l| {
        let deadline = l.config().deadline(request.timeout_ms);
        l.list_by_endorser(&request.endorser_id, request.domain.as_ref(), deadline)
    })
    .await?;
    Ok(ByEndorserResponse {
        endorsements: edges.iter().map(|e| e.view()).collect(),
    })
}

// ---------------------------------------------------------------------------
// ForRecipient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForRecipientRequest {
    pub recipient_id: UserId,
    pub domain: Option<Domain>,
    pub timeout_ms: Option<u64>,
}

/// Handle a ForRecipient request.
pub async fn handle_for_recipient<S: LedgerStore + 'static>(
    ledger: &Arc<EndorsementLedger<S>>,
    request: ForRecipientRequest,
) -> Result<RecipientSummary, RpcError> {
    run_blocking(ledger, move |l| {
        let deadline = l.config().deadline(request.timeout_ms);
        l.recipient_summary(&request.recipient_id, request.domain.as_ref(), deadline)
    })
    .await
}

// ---------------------------------------------------------------------------
// Influence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluenceRequest {
    pub user_id: UserId,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluenceResponse {
    pub user_id: UserId,
    pub influence: u64,
}

/// Handle an Influence request.
pub async fn handle_influence<S: LedgerStore + 'static>(
    ledger: &Arc<EndorsementLedger<S>>,
    request: InfluenceRequest,
) -> Result<InfluenceResponse, RpcError> {
    let user_id = request.user_id.clone();
    let influence = run_blocking(ledger, move |l| {
        let deadline = l.config().deadline(request.timeout_ms);
        l.influence(&request.user_id, deadline)
    })
    .await?;
    Ok(InfluenceResponse { user_id, influence })
}

#[cfg(test)]
mod tests {
    use accolade_store::MemoryStore;

    use super::*;

    fn ledger() -> Arc<EndorsementLedger<MemoryStore>> {
        Arc::new(EndorsementLedger::new(MemoryStore::new()))
    }

    fn submit_req(from: &str, to: &str, domain: &str) -> SubmitRequest {
        SubmitRequest {
            endorser_id: UserId::new(from).unwrap(),
            recipient_id: UserId::new(to).unwrap(),
            domain: Domain::new(domain).unwrap(),
            timeout_ms: None,
        }
    }

    #[tokio::test]
    async fn submit_returns_view_and_influence_follows() {
        let ledger = ledger();
        let view = handle_submit(&ledger, submit_req("x", "y", "skill"))
            .await
            .unwrap();
        assert_eq!(view.endorser_id.as_str(), "x");
        assert_eq!(view.recipient_id.as_str(), "y");

        let resp = handle_influence(
            &ledger,
            InfluenceRequest {
                user_id: UserId::new("y").unwrap(),
                timeout_ms: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.influence, 1);
    }

    #[tokio::test]
    async fn remove_of_missing_edge_is_not_found() {
        let ledger = ledger();
        let err = handle_remove(
            &ledger,
            RemoveRequest {
                endorser_id: UserId::new("x").unwrap(),
                domain: Domain::new("skill").unwrap(),
                recipient_id: None,
                timeout_ms: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "not_found");
    }

    #[tokio::test]
    async fn remove_then_list_is_empty() {
        let ledger = ledger();
        handle_submit(&ledger, submit_req("x", "y", "skill"))
            .await
            .unwrap();
        let resp = handle_remove(
            &ledger,
            RemoveRequest {
                endorser_id: UserId::new("x").unwrap(),
                domain: Domain::new("skill").unwrap(),
                recipient_id: Some(UserId::new("y").unwrap()),
                timeout_ms: None,
            },
        )
        .await
        .unwrap();
        assert!(resp.removed);

        let listed = handle_by_endorser(
            &ledger,
            ByEndorserRequest {
                endorser_id: UserId::new("x").unwrap(),
                domain: None,
                timeout_ms: None,
            },
        )
        .await
        .unwrap();
        assert!(listed.endorsements.is_empty());
    }

    #[tokio::test]
    async fn for_recipient_summarises_by_domain() {
        let ledger = ledger();
        for (from, domain) in [("a", "skill"), ("b", "skill"), ("a", "ethics")] {
            handle_submit(&ledger, submit_req(from, "r", domain))
                .await
                .unwrap();
        }
        let summary = handle_for_recipient(
            &ledger,
            ForRecipientRequest {
                recipient_id: UserId::new("r").unwrap(),
                domain: None,
                timeout_ms: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count_by_domain.get("skill"), Some(&2));
        assert_eq!(summary.count_by_domain.get("ethics"), Some(&1));
    }
}
