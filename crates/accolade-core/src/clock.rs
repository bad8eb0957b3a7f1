// crates/accolade-core/src/clock.rs
//
// Wall-clock source for edge creation timestamps.

use chrono::{DateTime, Utc};

/// Source of `created_at` timestamps for new edges.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
