// crates/accolade-core/src/recipient.rs
//
// Aggregated view of the endorsements a user has received.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::endorsement::{Endorsement, UserId};

/// Recipient-facing aggregate: edge counts and weights per domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientSummary {
    pub recipient_id: UserId,
    /// Number of incoming edges.
    pub total: u64,
    /// Number of incoming edges per domain.
    pub count_by_domain: BTreeMap<String, u64>,
    /// Sum of incoming edge weights per domain.
    pub weight_by_domain: BTreeMap<String, u64>,
    /// Endorser ids per domain, ascending.
    pub endorsers_by_domain: BTreeMap<String, Vec<UserId>>,
}

impl RecipientSummary {
    /// Fold a recipient's edges into a summary. Edges for other recipients
    /// are ignored.
    pub fn from_edges(recipient_id: UserId, edges: &[Endorsement]) -> Self {
        let mut summary = Self {
            recipient_id,
            total: 0,
            count_by_domain: BTreeMap::new(),
            weight_by_domain: BTreeMap::new(),
            endorsers_by_domain: BTreeMap::new(),
        };

        for edge in edges.iter().filter(|e| e.recipient_id == summary.recipient_id) {
            let domain = edge.domain.as_str().to_string();
            summary.total += 1;
            *summary.count_by_domain.entry(domain.clone()).or_insert(0) += 1;
            let w = summary.weight_by_domain.entry(domain.clone()).or_insert(0);
            *w = w.saturating_add(edge.weight);
            summary
                .endorsers_by_domain
                .entry(domain)
                .or_default()
                .push(edge.endorser_id.clone());
        }

        for endorsers in summary.endorsers_by_domain.values_mut() {
            endorsers.sort();
        }

        summary
    }
}
