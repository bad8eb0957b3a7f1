// crates/accolade-ledger/src/remover.rs
//
// Endorsement Remover.
//
// Removal is keyed by (endorser, domain) and optionally narrowed to one
// recipient. Without a recipient every edge of the endorser in the domain
// is deleted; with one, only that (endorser, recipient, domain) edge is.
// Either way the call is a single transaction and is idempotent.

use accolade_core::{Deadline, Domain, EdgeKey, LedgerError, LedgerStore, UserId};

use crate::ledger::EndorsementLedger;

impl<S: LedgerStore> EndorsementLedger<S> {
    /// Delete `endorser`'s endorsements in `domain`, or only the one for
    /// `recipient` when given. Returns whether anything was deleted.
    pub fn remove(
        &self,
        endorser: &UserId,
        domain: &Domain,
        recipient: Option<&UserId>,
        deadline: Deadline,
    ) -> Result<bool, LedgerError> {
        let deleted = self.retry.run("remove", deadline, || {
            self.store.transact(|txn| {
                let deleted = match recipient {
                    Some(r) => {
                        let key = EdgeKey::new(endorser.clone(), r.clone(), domain.clone());
                        usize::from(txn.delete_edge(&key)?)
                    }
                    None => {
                        let mut count = 0;
                        for edge in txn.edges_from(endorser, Some(domain))? {
                            if txn.delete_edge(&edge.key())? {
                                count += 1;
                            }
                        }
                        count
                    }
                };
                deadline.check("remove")?;
                Ok(deleted)
            })
        })?;

        if deleted > 0 {
            tracing::info!(
                "Removed {} endorsement(s) by {} in '{}'",
                deleted,
                endorser,
                domain
            );
        } else {
            tracing::debug!("No endorsement by {} in '{}' to remove", endorser, domain);
        }
        Ok(deleted > 0)
    }
}
