// crates/accolade-ledger/src/writer.rs
//
// Endorsement Writer: apply one endorsement atomically.
//
// Inside a single transaction the writer records both users, resolves the
// endorser's influence, and either creates the edge with that weight or
// adds the weight to the existing edge. Commit conflicts are retried per
// the ledger's RetryPolicy; an expired deadline rolls the attempt back.

use accolade_core::{Deadline, Domain, EdgeKey, Endorsement, LedgerError, LedgerStore, UserId};

use crate::ledger::EndorsementLedger;
use crate::weight;

impl<S: LedgerStore> EndorsementLedger<S> {
    /// Record that `endorser` endorses `recipient` in `domain`.
    ///
    /// Returns the edge as committed. Self-endorsement is accepted.
    pub fn submit(
        &self,
        endorser: &UserId,
        recipient: &UserId,
        domain: &Domain,
        deadline: Deadline,
    ) -> Result<Endorsement, LedgerError> {
        let key = EdgeKey::new(endorser.clone(), recipient.clone(), domain.clone());

        let edge = self.retry.run("submit", deadline, || {
            self.store.transact(|txn| {
                let now = self.clock.now();
                txn.ensure_user(endorser, now)?;
                txn.ensure_user(recipient, now)?;

                let weight = weight::resolve(txn, endorser)?;

                let edge = match txn.edge(&key)? {
                    Some(mut existing) => {
                        existing.accumulate(weight)?;
                        existing
                    }
                    None => Endorsement::create(key.clone(), weight, now),
                };
                txn.put_edge(&edge)?;

                // Last chance to abort before commit.
                deadline.check("submit")?;
                Ok(edge)
            })
        })?;

        tracing::info!(
            "Endorsement {} -> {} in '{}' committed (weight {})",
            endorser,
            recipient,
            domain,
            edge.weight
        );
        Ok(edge)
    }
}
