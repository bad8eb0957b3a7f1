// crates/accolade-core/src/rank.rs
//
// Ranking query and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::endorsement::{Domain, UserId};

/// Filters for a ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankQuery {
    /// Restrict to one domain.
    pub domain: Option<Domain>,
    /// Only count edges created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum entries returned. `None` uses the configured default;
    /// zero or negative values are rejected.
    pub limit: Option<i64>,
}

impl RankQuery {
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One (recipient, domain) row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub recipient_id: UserId,
    pub domain: Domain,
    /// Sum of edge weights in the group.
    pub count: u64,
    /// True for every entry of the returned top-`limit` slice.
    pub elected: bool,
    /// Earliest `created_at` among the group's edges.
    pub elected_at: DateTime<Utc>,
}
