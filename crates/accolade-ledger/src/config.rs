// crates/accolade-ledger/src/config.rs
//
// Tunables for the ledger: conflict retry, default deadline, rank size.
// Deserialized from the `[ledger]` table of the daemon config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use accolade_core::{Deadline, LedgerError};

use crate::retry::RetryPolicy;

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Retries after a commit conflict before giving up. Default: 8.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base of the exponential backoff between retries. Default: 2ms.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Upper bound on a single backoff. Default: 200ms.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Deadline applied when a caller does not supply one. 0 disables it.
    /// Default: 5000ms.
    #[serde(default = "default_deadline_ms")]
    pub default_deadline_ms: u64,

    /// Ranking size when the query does not set a limit. Default: 100.
    #[serde(default = "default_rank_limit")]
    pub default_rank_limit: i64,
}

fn default_max_retries() -> u32 {
    8
}

fn default_base_backoff_ms() -> u64 {
    2
}

fn default_max_backoff_ms() -> u64 {
    200
}

fn default_deadline_ms() -> u64 {
    5000
}

fn default_rank_limit() -> i64 {
    100
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            default_deadline_ms: default_deadline_ms(),
            default_rank_limit: default_rank_limit(),
        }
    }
}

impl LedgerConfig {
    /// Reject settings the ledger cannot run with.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.default_rank_limit <= 0 {
            return Err(LedgerError::InvalidInput(
                "default_rank_limit must be positive".to_string(),
            ));
        }
        if self.base_backoff_ms > self.max_backoff_ms {
            return Err(LedgerError::InvalidInput(
                "base_backoff_ms must not exceed max_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    /// Deadline for a request, preferring the caller's timeout.
    pub fn deadline(&self, timeout_ms: Option<u64>) -> Deadline {
        match timeout_ms.unwrap_or(self.default_deadline_ms) {
            0 => Deadline::none(),
            ms => Deadline::after(Duration::from_millis(ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_rank_limit, 100);
    }

    #[test]
    fn rejects_non_positive_rank_limit() {
        let config = LedgerConfig {
            default_rank_limit: 0,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = LedgerConfig::default();
        assert_eq!(config.deadline(Some(0)), Deadline::none());
        assert!(config.deadline(None).remaining().is_some());
    }

    #[test]
    fn retry_policy_follows_config() {
        let config = LedgerConfig {
            max_retries: 3,
            base_backoff_ms: 5,
            max_backoff_ms: 50,
            ..LedgerConfig::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_backoff, Duration::from_millis(5));
        assert_eq!(policy.max_backoff, Duration::from_millis(50));
    }
}
