// crates/accolade-core/src/traits.rs
//
// Repository interface for the Ledger Store.
//
// The ledger's invariants (weight resolution, create-or-accumulate, removal
// bookkeeping) live in accolade-ledger and run against these two traits, so
// every backend enforces them the same way regardless of its storage engine.

use chrono::{DateTime, Utc};

use crate::endorsement::{Domain, EdgeKey, Endorsement, UserId};
use crate::error::LedgerError;

/// Read-write view of the ledger inside one serializable transaction.
///
/// Every read observes the transaction's own uncommitted writes.
pub trait LedgerTxn {
    /// Record `user` if it has never been seen. `seen_at` is only stored
    /// for new records.
    fn ensure_user(&mut self, user: &UserId, seen_at: DateTime<Utc>) -> Result<(), LedgerError>;

    /// Sum of `weight` over every edge whose recipient is `user`.
    fn incoming_weight(&mut self, user: &UserId) -> Result<u64, LedgerError>;

    /// The edge for `key`, if any.
    fn edge(&mut self, key: &EdgeKey) -> Result<Option<Endorsement>, LedgerError>;

    /// Insert or overwrite an edge, keeping the recipient's incoming
    /// weight consistent.
    fn put_edge(&mut self, edge: &Endorsement) -> Result<(), LedgerError>;

    /// Delete the edge for `key`. Returns whether it existed.
    fn delete_edge(&mut self, key: &EdgeKey) -> Result<bool, LedgerError>;

    /// Edges created by `endorser`, optionally restricted to `domain`.
    fn edges_from(
        &mut self,
        endorser: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError>;
}

/// A Ledger Store backend.
///
/// `transact` runs exactly one attempt: it opens a transaction, runs `body`,
/// commits if `body` returns `Ok`, and rolls back otherwise. Contention
/// detected at commit is reported as `LedgerError::Conflict`; retrying is
/// the caller's decision. Resources held by the attempt are released on
/// every exit path.
///
/// Plain reads run at read-committed isolation outside any transaction.
pub trait LedgerStore: Send + Sync {
    fn transact<T, F>(&self, body: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T, LedgerError>;

    /// Edges created by `endorser`, optionally restricted to `domain`.
    fn edges_by_endorser(
        &self,
        endorser: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError>;

    /// Edges received by `recipient`, optionally restricted to `domain`.
    fn edges_by_recipient(
        &self,
        recipient: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError>;

    /// Every edge, optionally restricted to `domain`.
    fn scan_edges(&self, domain: Option<&Domain>) -> Result<Vec<Endorsement>, LedgerError>;

    /// Sum of incoming edge weights for `user`, read outside a transaction.
    fn incoming_weight(&self, user: &UserId) -> Result<u64, LedgerError>;

    /// Whether `user` has ever appeared as endorser or recipient.
    fn contains_user(&self, user: &UserId) -> Result<bool, LedgerError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
