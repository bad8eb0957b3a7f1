// crates/accolade-core/src/endorsement.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

/// Longest identifier or domain accepted, in bytes.
pub const MAX_LABEL_LEN: usize = 256;

/// Shared validation for user ids and domains.
///
/// Control characters are rejected because NUL separates key segments in
/// the RocksDB backend.
fn validate_label(kind: &str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidInput(format!("{} must not be empty", kind)));
    }
    if value.len() > MAX_LABEL_LEN {
        return Err(LedgerError::InvalidInput(format!(
            "{} exceeds {} bytes",
            kind, MAX_LABEL_LEN
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(LedgerError::InvalidInput(format!(
            "{} contains control characters",
            kind
        )));
    }
    Ok(())
}

/// Opaque user identifier. Users exist implicitly once they appear on
/// either end of an endorsement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Result<Self, LedgerError> {
        let value = value.into();
        validate_label("user id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form category tag partitioning endorsements into independent
/// ranking spaces (e.g. "skill", "leadership").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    pub fn new(value: impl Into<String>) -> Result<Self, LedgerError> {
        let value = value.into();
        validate_label("domain", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Domain {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of an endorsement edge. At most one edge exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub endorser_id: UserId,
    pub recipient_id: UserId,
    pub domain: Domain,
}

impl EdgeKey {
    pub fn new(endorser_id: UserId, recipient_id: UserId, domain: Domain) -> Self {
        Self {
            endorser_id,
            recipient_id,
            domain,
        }
    }
}

/// A directed, domain-scoped endorsement carrying an accumulated weight.
///
/// `id` and `created_at` are fixed on first creation. `weight` only grows,
/// and each increment is the endorser's influence at the time of that
/// submission; it is never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    /// Unique identifier (UUID v7 for time-ordering).
    pub id: Uuid,
    pub endorser_id: UserId,
    pub recipient_id: UserId,
    pub domain: Domain,
    /// Timestamp of the first endorsement of this triple.
    pub created_at: DateTime<Utc>,
    /// Accumulated influence transferred through this edge. Always >= 1.
    pub weight: u64,
}

impl Endorsement {
    /// A fresh edge for `key` carrying `weight`.
    pub fn create(key: EdgeKey, weight: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            endorser_id: key.endorser_id,
            recipient_id: key.recipient_id,
            domain: key.domain,
            created_at,
            weight,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(
            self.endorser_id.clone(),
            self.recipient_id.clone(),
            self.domain.clone(),
        )
    }

    /// Add `weight` to this edge, failing on overflow.
    pub fn accumulate(&mut self, weight: u64) -> Result<(), LedgerError> {
        self.weight = self.weight.checked_add(weight).ok_or_else(|| {
            LedgerError::Persistence(format!(
                "weight overflow on endorsement {}",
                self.id
            ))
        })?;
        Ok(())
    }

    /// The wire shape, which does not carry the raw weight.
    pub fn view(&self) -> EndorsementView {
        EndorsementView::from(self)
    }
}

/// Wire shape of an endorsement: `{id, endorserId, recipientId, domain, createdAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndorsementView {
    pub id: Uuid,
    pub endorser_id: UserId,
    pub recipient_id: UserId,
    pub domain: Domain,
    pub created_at: DateTime<Utc>,
}

impl From<&Endorsement> for EndorsementView {
    fn from(e: &Endorsement) -> Self {
        Self {
            id: e.id,
            endorser_id: e.endorser_id.clone(),
            recipient_id: e.recipient_id.clone(),
            domain: e.domain.clone(),
            created_at: e.created_at,
        }
    }
}
