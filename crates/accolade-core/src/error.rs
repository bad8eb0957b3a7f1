use thiserror::Error;

/// Ledger-wide error types for Accolade.
///
/// Every failure is returned to the caller; nothing in the ledger logs an
/// error and then swallows it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Malformed or missing identifier, empty domain, non-positive limit.
    /// Raised before any transaction is opened.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A removal targeted no existing endorsement.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store detected contention on commit. Retried by the writer.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store unreachable, commit failed after retries, or decoding failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// The caller's deadline passed; the ledger was left unmodified.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl LedgerError {
    /// Stable machine-readable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidInput(_) => "invalid_input",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Persistence(_) => "persistence_failure",
            LedgerError::Timeout(_) => "timeout",
        }
    }

    /// Only store contention is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict(_))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Persistence(format!("decode failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(LedgerError::InvalidInput("x".into()).code(), "invalid_input");
        assert_eq!(LedgerError::NotFound("x".into()).code(), "not_found");
        assert_eq!(LedgerError::Conflict("x".into()).code(), "conflict");
        assert_eq!(LedgerError::Persistence("x".into()).code(), "persistence_failure");
        assert_eq!(LedgerError::Timeout("x".into()).code(), "timeout");
    }

    #[test]
    fn only_conflict_is_retryable() {
        assert!(LedgerError::Conflict("busy".into()).is_retryable());
        assert!(!LedgerError::Persistence("io".into()).is_retryable());
        assert!(!LedgerError::Timeout("late".into()).is_retryable());
    }

    #[test]
    fn json_errors_become_persistence_failures() {
        let err = serde_json::from_str::<u64>("not json").unwrap_err();
        let mapped: LedgerError = err.into();
        assert_eq!(mapped.code(), "persistence_failure");
    }
}
