// crates/accolade-ledger/src/reader.rs
//
// Endorsement Reader: point and list queries. Pure reads at read-committed
// isolation; an empty result is not an error.

use accolade_core::{Deadline, Domain, Endorsement, LedgerError, LedgerStore, RecipientSummary, UserId};

use crate::ledger::EndorsementLedger;
use crate::weight;

/// Stable presentation order: oldest first, UUID v7 breaks ties.
fn sort_edges(edges: &mut [Endorsement]) {
    edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

impl<S: LedgerStore> EndorsementLedger<S> {
    /// Edges created by `endorser`, optionally restricted to `domain`.
    pub fn list_by_endorser(
        &self,
        endorser: &UserId,
        domain: Option<&Domain>,
        deadline: Deadline,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        deadline.check("list_by_endorser")?;
        let mut edges = self.store.edges_by_endorser(endorser, domain)?;
        deadline.check("list_by_endorser")?;
        sort_edges(&mut edges);
        tracing::debug!("{} endorsements given by {}", edges.len(), endorser);
        Ok(edges)
    }

    /// Edges received by `recipient`, optionally restricted to `domain`.
    pub fn list_by_recipient(
        &self,
        recipient: &UserId,
        domain: Option<&Domain>,
        deadline: Deadline,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        deadline.check("list_by_recipient")?;
        let mut edges = self.store.edges_by_recipient(recipient, domain)?;
        deadline.check("list_by_recipient")?;
        sort_edges(&mut edges);
        tracing::debug!("{} endorsements received by {}", edges.len(), recipient);
        Ok(edges)
    }

    /// Recipient-facing aggregate of the edges `recipient` has received.
    pub fn recipient_summary(
        &self,
        recipient: &UserId,
        domain: Option<&Domain>,
        deadline: Deadline,
    ) -> Result<RecipientSummary, LedgerError> {
        let edges = self.list_by_recipient(recipient, domain, deadline)?;
        Ok(RecipientSummary::from_edges(recipient.clone(), &edges))
    }

    /// Current influence of `user` (>= 1), read outside a write transaction.
    pub fn influence(&self, user: &UserId, deadline: Deadline) -> Result<u64, LedgerError> {
        deadline.check("influence")?;
        let sum = self.store.incoming_weight(user)?;
        deadline.check("influence")?;
        Ok(weight::influence_from_sum(sum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dom, ledger, uid};

    #[test]
    fn lists_filter_by_domain() {
        let ledger = ledger();
        ledger.submit(&uid("a"), &uid("b"), &dom("skill"), Deadline::none()).unwrap();
        ledger.submit(&uid("a"), &uid("c"), &dom("ethics"), Deadline::none()).unwrap();
        ledger.submit(&uid("d"), &uid("b"), &dom("skill"), Deadline::none()).unwrap();

        let given = ledger.list_by_endorser(&uid("a"), None, Deadline::none()).unwrap();
        assert_eq!(given.len(), 2);
        let given_skill = ledger
            .list_by_endorser(&uid("a"), Some(&dom("skill")), Deadline::none())
            .unwrap();
        assert_eq!(given_skill.len(), 1);
        assert_eq!(given_skill[0].recipient_id, uid("b"));

        let received = ledger.list_by_recipient(&uid("b"), None, Deadline::none()).unwrap();
        assert_eq!(received.len(), 2);
        let received_ethics = ledger
            .list_by_recipient(&uid("b"), Some(&dom("ethics")), Deadline::none())
            .unwrap();
        assert!(received_ethics.is_empty());
    }

    #[test]
    fn unknown_users_yield_empty_lists() {
        let ledger = ledger();
        assert!(ledger.list_by_endorser(&uid("ghost"), None, Deadline::none()).unwrap().is_empty());
        assert!(ledger.list_by_recipient(&uid("ghost"), None, Deadline::none()).unwrap().is_empty());
    }

    #[test]
    fn summary_aggregates_per_domain() {
        let ledger = ledger();
        ledger.submit(&uid("a"), &uid("b"), &dom("skill"), Deadline::none()).unwrap();
        ledger.submit(&uid("c"), &uid("b"), &dom("skill"), Deadline::none()).unwrap();
        ledger.submit(&uid("a"), &uid("b"), &dom("ethics"), Deadline::none()).unwrap();

        let summary = ledger.recipient_summary(&uid("b"), None, Deadline::none()).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count_by_domain["skill"], 2);
        assert_eq!(summary.count_by_domain["ethics"], 1);
        assert_eq!(summary.endorsers_by_domain["skill"], vec![uid("a"), uid("c")]);
    }

    #[test]
    fn influence_has_a_baseline() {
        let ledger = ledger();
        assert_eq!(ledger.influence(&uid("nobody"), Deadline::none()).unwrap(), 1);
        ledger.submit(&uid("a"), &uid("b"), &dom("skill"), Deadline::none()).unwrap();
        ledger.submit(&uid("c"), &uid("b"), &dom("skill"), Deadline::none()).unwrap();
        assert_eq!(ledger.influence(&uid("b"), Deadline::none()).unwrap(), 2);
    }
}
