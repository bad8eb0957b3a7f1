// crates/accolade-ledger/src/testing.rs
//
// Shared fixtures for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use accolade_core::{Clock, Domain, Endorsement, LedgerError, LedgerStore, LedgerTxn, UserId};
use accolade_store::MemoryStore;

use crate::ledger::EndorsementLedger;

pub fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

pub fn dom(s: &str) -> Domain {
    Domain::new(s).unwrap()
}

pub fn ledger() -> EndorsementLedger<MemoryStore> {
    EndorsementLedger::new(MemoryStore::new())
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Store wrapper whose first `failures` transactions report a conflict.
pub struct FlakyStore<S> {
    inner: S,
    failures_left: AtomicU32,
    attempts: AtomicU32,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: S, failures: u32) -> Self {
        Self {
            inner,
            failures_left: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: LedgerStore> LedgerStore for FlakyStore<S> {
    fn transact<T, F>(&self, body: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T, LedgerError>,
    {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(LedgerError::Conflict("injected".to_string()));
        }
        self.inner.transact(body)
    }

    fn edges_by_endorser(&self, endorser: &UserId, domain: Option<&Domain>) -> Result<Vec<Endorsement>, LedgerError> {
        self.inner.edges_by_endorser(endorser, domain)
    }

    fn edges_by_recipient(&self, recipient: &UserId, domain: Option<&Domain>) -> Result<Vec<Endorsement>, LedgerError> {
        self.inner.edges_by_recipient(recipient, domain)
    }

    fn scan_edges(&self, domain: Option<&Domain>) -> Result<Vec<Endorsement>, LedgerError> {
        self.inner.scan_edges(domain)
    }

    fn incoming_weight(&self, user: &UserId) -> Result<u64, LedgerError> {
        self.inner.incoming_weight(user)
    }

    fn contains_user(&self, user: &UserId) -> Result<bool, LedgerError> {
        self.inner.contains_user(user)
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}
