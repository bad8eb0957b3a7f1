// crates/accolade-ledger/src/rank.rs
//
// Rank Aggregator.
//
// Groups edges by (recipient, domain), sums their weights into `count`, and
// takes the earliest `created_at` as `elected_at`. Ordering is `count`
// descending, then recipient id ascending, then domain ascending, so equal
// input always yields the same ranking. Every entry in the returned top-N
// slice is marked elected.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use accolade_core::{Deadline, Domain, Endorsement, LedgerError, LedgerStore, RankEntry, RankQuery, UserId};

use crate::ledger::EndorsementLedger;

/// Turn a requested limit into a slice size, rejecting `limit <= 0`.
pub fn resolve_limit(requested: Option<i64>, default_limit: i64) -> Result<usize, LedgerError> {
    let limit = requested.unwrap_or(default_limit);
    if limit <= 0 {
        return Err(LedgerError::InvalidInput(format!(
            "limit must be positive, got {}",
            limit
        )));
    }
    Ok(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Aggregate `edges` into a ranking of at most `limit` entries.
///
/// Edges outside the query's domain or created before `since` are skipped.
pub fn aggregate(edges: &[Endorsement], query: &RankQuery, limit: usize) -> Vec<RankEntry> {
    let mut groups: BTreeMap<(&UserId, &Domain), (u64, DateTime<Utc>)> = BTreeMap::new();

    for edge in edges {
        if query.domain.as_ref().is_some_and(|d| &edge.domain != d) {
            continue;
        }
        if query.since.is_some_and(|since| edge.created_at < since) {
            continue;
        }
        groups
            .entry((&edge.recipient_id, &edge.domain))
            .and_modify(|(count, first)| {
                *count = count.saturating_add(edge.weight);
                if edge.created_at < *first {
                    *first = edge.created_at;
                }
            })
            .or_insert((edge.weight, edge.created_at));
    }

    // Groups come out in (recipient, domain) order; a stable sort on count
    // keeps that as the tie-break.
    let mut ranked: Vec<_> = groups.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|((recipient, domain), (count, first))| RankEntry {
            recipient_id: recipient.clone(),
            domain: domain.clone(),
            count,
            elected: true,
            elected_at: first,
        })
        .collect()
}

impl<S: LedgerStore> EndorsementLedger<S> {
    /// Rank recipients by the weighted endorsements they received.
    pub fn rank(&self, query: &RankQuery, deadline: Deadline) -> Result<Vec<RankEntry>, LedgerError> {
        let limit = resolve_limit(query.limit, self.config.default_rank_limit)?;
        deadline.check("rank")?;

        let edges = self.store.scan_edges(query.domain.as_ref())?;
        deadline.check("rank")?;

        let ranking = aggregate(&edges, query, limit);
        tracing::debug!(
            "Ranked {} edges into {} entries (limit {})",
            edges.len(),
            ranking.len(),
            limit
        );
        Ok(ranking)
    }
}
