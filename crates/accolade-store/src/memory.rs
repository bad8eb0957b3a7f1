// crates/accolade-store/src/memory.rs
//
// In-memory Ledger Store.
//
// All ledger state sits behind one mutex. A transaction holds the lock for
// its whole lifetime, which makes transactions trivially serializable, and
// stages its writes in an overlay that is merged into the shared state only
// when the body succeeds. A failed body leaves the state untouched.
//
// Edges are kept in a map keyed by (endorser, recipient, domain) with
// per-endorser and per-recipient key indexes, so cycles in the endorsement
// graph need no special handling.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use accolade_core::endorsement::{Domain, EdgeKey, Endorsement, UserId};
use accolade_core::error::LedgerError;
use accolade_core::traits::{LedgerStore, LedgerTxn};

#[derive(Debug, Default)]
struct LedgerState {
    /// Known users and when they were first seen.
    users: BTreeMap<UserId, DateTime<Utc>>,
    edges: BTreeMap<EdgeKey, Endorsement>,
    by_endorser: BTreeMap<UserId, BTreeSet<EdgeKey>>,
    by_recipient: BTreeMap<UserId, BTreeSet<EdgeKey>>,
}

impl LedgerState {
    fn insert_edge(&mut self, edge: Endorsement) {
        let key = edge.key();
        self.by_endorser
            .entry(key.endorser_id.clone())
            .or_default()
            .insert(key.clone());
        self.by_recipient
            .entry(key.recipient_id.clone())
            .or_default()
            .insert(key.clone());
        self.edges.insert(key, edge);
    }

    fn remove_edge(&mut self, key: &EdgeKey) {
        if self.edges.remove(key).is_none() {
            return;
        }
        if let Some(keys) = self.by_endorser.get_mut(&key.endorser_id) {
            keys.remove(key);
            if keys.is_empty() {
                self.by_endorser.remove(&key.endorser_id);
            }
        }
        if let Some(keys) = self.by_recipient.get_mut(&key.recipient_id) {
            keys.remove(key);
            if keys.is_empty() {
                self.by_recipient.remove(&key.recipient_id);
            }
        }
    }

    fn incoming_weight(&self, user: &UserId) -> Result<u64, LedgerError> {
        let sum = self
            .by_recipient
            .get(user)
            .into_iter()
            .flatten()
            .filter_map(|k| self.edges.get(k))
            .try_fold(0u64, |acc, e| acc.checked_add(e.weight));
        sum.ok_or_else(|| influence_overflow(user))
    }

    fn collect(&self, keys: Option<&BTreeSet<EdgeKey>>, domain: Option<&Domain>) -> Vec<Endorsement> {
        keys.into_iter()
            .flatten()
            .filter(|k| domain.map_or(true, |d| &k.domain == d))
            .filter_map(|k| self.edges.get(k).cloned())
            .collect()
    }

    /// Merge a committed transaction's overlay.
    fn apply(
        &mut self,
        users: BTreeMap<UserId, DateTime<Utc>>,
        edges: BTreeMap<EdgeKey, Option<Endorsement>>,
    ) {
        for (user, seen_at) in users {
            self.users.entry(user).or_insert(seen_at);
        }
        for (key, staged) in edges {
            match staged {
                Some(edge) => self.insert_edge(edge),
                None => self.remove_edge(&key),
            }
        }
    }
}

fn influence_overflow(user: &UserId) -> LedgerError {
    LedgerError::Persistence(format!("influence counter out of range for {}", user))
}

/// Uncommitted view over the locked state.
struct MemoryTxn<'a> {
    base: &'a LedgerState,
    users: BTreeMap<UserId, DateTime<Utc>>,
    /// Staged edge writes; `None` marks a deletion.
    edges: BTreeMap<EdgeKey, Option<Endorsement>>,
}

impl<'a> MemoryTxn<'a> {
    fn new(base: &'a LedgerState) -> Self {
        Self {
            base,
            users: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }
}

impl LedgerTxn for MemoryTxn<'_> {
    fn ensure_user(&mut self, user: &UserId, seen_at: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.base.users.contains_key(user) {
            self.users.entry(user.clone()).or_insert(seen_at);
        }
        Ok(())
    }

    fn incoming_weight(&mut self, user: &UserId) -> Result<u64, LedgerError> {
        let committed = self
            .base
            .by_recipient
            .get(user)
            .into_iter()
            .flatten()
            .filter(|k| !self.edges.contains_key(*k))
            .filter_map(|k| self.base.edges.get(k))
            .try_fold(0u64, |acc, e| acc.checked_add(e.weight));

        let staged = self
            .edges
            .iter()
            .filter(|(k, _)| &k.recipient_id == user)
            .filter_map(|(_, e)| e.as_ref())
            .try_fold(0u64, |acc, e| acc.checked_add(e.weight));

        committed
            .zip(staged)
            .and_then(|(c, s)| c.checked_add(s))
            .ok_or_else(|| influence_overflow(user))
    }

    fn edge(&mut self, key: &EdgeKey) -> Result<Option<Endorsement>, LedgerError> {
        match self.edges.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => Ok(self.base.edges.get(key).cloned()),
        }
    }

    fn put_edge(&mut self, edge: &Endorsement) -> Result<(), LedgerError> {
        let key = edge.key();
        let previous = self.edge(&key)?.map(|e| e.weight).unwrap_or(0);
        self.incoming_weight(&key.recipient_id)?
            .checked_sub(previous)
            .and_then(|t| t.checked_add(edge.weight))
            .ok_or_else(|| influence_overflow(&key.recipient_id))?;

        self.edges.insert(key, Some(edge.clone()));
        Ok(())
    }

    fn delete_edge(&mut self, key: &EdgeKey) -> Result<bool, LedgerError> {
        let existed = self.edge(key)?.is_some();
        if existed {
            self.edges.insert(key.clone(), None);
        }
        Ok(existed)
    }

    fn edges_from(
        &mut self,
        endorser: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        let mut out: Vec<Endorsement> = self
            .base
            .by_endorser
            .get(endorser)
            .into_iter()
            .flatten()
            .filter(|k| !self.edges.contains_key(*k))
            .filter(|k| domain.map_or(true, |d| &k.domain == d))
            .filter_map(|k| self.base.edges.get(k).cloned())
            .collect();

        out.extend(
            self.edges
                .iter()
                .filter(|(k, _)| &k.endorser_id == endorser)
                .filter(|(k, _)| domain.map_or(true, |d| &k.domain == d))
                .filter_map(|(_, e)| e.clone()),
        );

        Ok(out)
    }
}

/// In-memory `LedgerStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LedgerState>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges currently stored.
    pub fn edge_count(&self) -> Result<usize, LedgerError> {
        Ok(self.lock()?.edges.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|e| LedgerError::Persistence(format!("Mutex poisoned: {}", e)))
    }
}

impl LedgerStore for MemoryStore {
    fn transact<T, F>(&self, body: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T, LedgerError>,
    {
        let mut state = self.lock()?;
        let mut txn = MemoryTxn::new(&state);
        let out = body(&mut txn)?;
        let MemoryTxn { users, edges, .. } = txn;
        state.apply(users, edges);
        Ok(out)
    }

    fn edges_by_endorser(
        &self,
        endorser: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        let state = self.lock()?;
        Ok(state.collect(state.by_endorser.get(endorser), domain))
    }

    fn edges_by_recipient(
        &self,
        recipient: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        let state = self.lock()?;
        Ok(state.collect(state.by_recipient.get(recipient), domain))
    }

    fn scan_edges(&self, domain: Option<&Domain>) -> Result<Vec<Endorsement>, LedgerError> {
        let state = self.lock()?;
        Ok(state
            .edges
            .values()
            .filter(|e| domain.map_or(true, |d| &e.domain == d))
            .cloned()
            .collect())
    }

    fn incoming_weight(&self, user: &UserId) -> Result<u64, LedgerError> {
        self.lock()?.incoming_weight(user)
    }

    fn contains_user(&self, user: &UserId) -> Result<bool, LedgerError> {
        Ok(self.lock()?.users.contains_key(user))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn key(a: &str, b: &str, d: &str) -> EdgeKey {
        EdgeKey::new(uid(a), uid(b), Domain::new(d).unwrap())
    }

    fn put(store: &MemoryStore, a: &str, b: &str, d: &str, weight: u64) {
        store
            .transact(|txn| {
                let edge = Endorsement::create(key(a, b, d), weight, Utc::now());
                txn.put_edge(&edge)
            })
            .unwrap();
    }

    #[test]
    fn committed_writes_are_visible_to_reads() {
        let store = MemoryStore::new();
        put(&store, "alice", "bob", "skill", 3);
        put(&store, "carol", "bob", "skill", 4);

        assert_eq!(store.incoming_weight(&uid("bob")).unwrap(), 7);
        assert_eq!(store.edges_by_recipient(&uid("bob"), None).unwrap().len(), 2);
        assert_eq!(store.edges_by_endorser(&uid("alice"), None).unwrap().len(), 1);
        assert_eq!(store.edge_count().unwrap(), 2);
    }

    #[test]
    fn failed_body_leaves_state_untouched() {
        let store = MemoryStore::new();
        let result: Result<(), LedgerError> = store.transact(|txn| {
            txn.ensure_user(&uid("alice"), Utc::now())?;
            txn.put_edge(&Endorsement::create(key("alice", "bob", "skill"), 1, Utc::now()))?;
            Err(LedgerError::Timeout("late".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.edge_count().unwrap(), 0);
        assert!(!store.contains_user(&uid("alice")).unwrap());
    }

    #[test]
    fn txn_reads_see_staged_writes() {
        let store = MemoryStore::new();
        put(&store, "alice", "bob", "skill", 2);

        store
            .transact(|txn| {
                txn.put_edge(&Endorsement::create(key("carol", "bob", "skill"), 5, Utc::now()))?;
                assert_eq!(txn.incoming_weight(&uid("bob"))?, 7);

                assert!(txn.delete_edge(&key("alice", "bob", "skill"))?);
                assert_eq!(txn.incoming_weight(&uid("bob"))?, 5);
                assert!(txn.edge(&key("alice", "bob", "skill"))?.is_none());
                assert!(!txn.delete_edge(&key("alice", "bob", "skill"))?);
                Ok(())
            })
            .unwrap();

        assert_eq!(store.incoming_weight(&uid("bob")).unwrap(), 5);
    }

    #[test]
    fn edges_from_merges_staged_and_filters_domain() {
        let store = MemoryStore::new();
        put(&store, "alice", "bob", "skill", 1);
        put(&store, "alice", "carol", "ethics", 1);

        store
            .transact(|txn| {
                txn.put_edge(&Endorsement::create(key("alice", "dave", "skill"), 1, Utc::now()))?;
                let skill = Domain::new("skill").unwrap();
                assert_eq!(txn.edges_from(&uid("alice"), Some(&skill))?.len(), 2);
                assert_eq!(txn.edges_from(&uid("alice"), None)?.len(), 3);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn recipient_total_overflow_is_rejected() {
        let store = MemoryStore::new();
        put(&store, "alice", "bob", "skill", u64::MAX - 1);

        let result = store.transact(|txn| {
            txn.put_edge(&Endorsement::create(key("carol", "bob", "skill"), 2, Utc::now()))
        });
        assert!(matches!(result, Err(LedgerError::Persistence(_))));
        assert_eq!(store.incoming_weight(&uid("bob")).unwrap(), u64::MAX - 1);
        assert_eq!(store.edge_count().unwrap(), 1);

        // Replacing the existing edge only counts the difference.
        store
            .transact(|txn| {
                txn.put_edge(&Endorsement::create(key("alice", "bob", "skill"), u64::MAX, Utc::now()))
            })
            .unwrap();
        assert_eq!(store.incoming_weight(&uid("bob")).unwrap(), u64::MAX);
    }

    #[test]
    fn cyclic_edges_are_plain_records() {
        let store = MemoryStore::new();
        put(&store, "alice", "bob", "skill", 1);
        put(&store, "bob", "alice", "skill", 1);
        put(&store, "alice", "alice", "skill", 1);

        assert_eq!(store.incoming_weight(&uid("alice")).unwrap(), 2);
        assert_eq!(store.scan_edges(None).unwrap().len(), 3);
    }
}
