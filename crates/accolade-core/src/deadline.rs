// crates/accolade-core/src/deadline.rs
//
// Caller-supplied deadline for ledger operations.
//
// Writers check the deadline before each attempt and again right before
// commit; an expired deadline aborts the transaction (rollback) and is
// reported as `LedgerError::Timeout`, distinct from persistence failures.

use std::time::{Duration, Instant};

use crate::error::LedgerError;

/// An optional point in time after which an operation must give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline: the operation may take as long as the store needs.
    pub fn none() -> Self {
        Self { at: None }
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
        }
    }

    /// A deadline at an absolute instant.
    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }

    /// Time left before expiry. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fail with `Timeout` if the deadline has passed.
    pub fn check(&self, operation: &str) -> Result<(), LedgerError> {
        if self.is_expired() {
            return Err(LedgerError::Timeout(format!(
                "{} exceeded its deadline",
                operation
            )));
        }
        Ok(())
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
