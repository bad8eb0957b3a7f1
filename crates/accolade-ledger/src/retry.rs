// crates/accolade-ledger/src/retry.rs
//
// Bounded retry of store transactions on commit conflicts.
//
// Only `LedgerError::Conflict` is retried. Each wait is exponential in the
// attempt number, capped, with random jitter so that colliding writers
// spread out. Exhausting the budget surfaces a persistence failure; running
// out of deadline surfaces a timeout.

use std::time::Duration;

use rand::Rng;

use accolade_core::{Deadline, LedgerError};

/// Retry budget and backoff shape.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 8,
            base_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
            .min(self.max_backoff);
        let jitter_ms = self.base_backoff.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        exp + jitter
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error,
    /// exhausts the retry budget, or runs out of deadline.
    pub fn run<T, F>(&self, operation: &str, deadline: Deadline, mut attempt: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Result<T, LedgerError>,
    {
        let mut retries = 0u32;
        loop {
            deadline.check(operation)?;

            let err = match attempt() {
                Ok(out) => return Ok(out),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if retries >= self.max_retries {
                tracing::error!(
                    "{} gave up after {} attempts: {}",
                    operation,
                    retries + 1,
                    err
                );
                return Err(LedgerError::Persistence(format!(
                    "{} could not commit after {} attempts: {}",
                    operation,
                    retries + 1,
                    err
                )));
            }

            let wait = self.backoff(retries);
            if deadline.remaining().is_some_and(|left| left <= wait) {
                return Err(LedgerError::Timeout(format!(
                    "{} exceeded its deadline while retrying a conflict",
                    operation
                )));
            }

            tracing::warn!(
                "{} conflicted (attempt {}), retrying in {:?}",
                operation,
                retries + 1,
                wait
            );
            std::thread::sleep(wait);
            retries += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Instant;

    use super::*;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(20),
        };
        for attempt in 0..40 {
            assert!(policy.backoff(attempt) <= Duration::from_millis(22));
        }
        assert!(policy.backoff(0) >= Duration::from_millis(2));
    }

    #[test]
    fn conflicts_are_retried_until_success() {
        let calls = Cell::new(0);
        let out = fast_policy(5).run("submit", Deadline::none(), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(LedgerError::Conflict("busy".into()))
            } else {
                Ok(7)
            }
        });
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausted_retries_become_persistence_failure() {
        let calls = Cell::new(0);
        let out: Result<(), _> = fast_policy(2).run("submit", Deadline::none(), || {
            calls.set(calls.get() + 1);
            Err(LedgerError::Conflict("busy".into()))
        });
        assert!(matches!(out, Err(LedgerError::Persistence(_))));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn other_errors_are_not_retried() {
        let calls = Cell::new(0);
        let out: Result<(), _> = fast_policy(5).run("submit", Deadline::none(), || {
            calls.set(calls.get() + 1);
            Err(LedgerError::Persistence("disk".into()))
        });
        assert!(matches!(out, Err(LedgerError::Persistence(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn expired_deadline_stops_before_first_attempt() {
        let calls = Cell::new(0);
        let past = Deadline::at(Instant::now() - Duration::from_millis(1));
        let out: Result<(), _> = fast_policy(5).run("submit", past, || {
            calls.set(calls.get() + 1);
            Ok(())
        });
        assert!(matches!(out, Err(LedgerError::Timeout(_))));
        assert_eq!(calls.get(), 0);
    }
}
