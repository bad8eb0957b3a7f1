// crates/accolade-ledger/src/ledger.rs
//
// EndorsementLedger: the service object tying the store handle, clock,
// and configuration together. Operations live in writer.rs, reader.rs,
// remover.rs, and rank.rs.

use std::sync::Arc;

use accolade_core::{Clock, LedgerError, LedgerStore, SystemClock};

use crate::config::LedgerConfig;
use crate::retry::RetryPolicy;

/// The endorsement ledger over a `LedgerStore` backend.
///
/// Holds no mutable state of its own; it is safe to share behind an `Arc`
/// and call from many threads at once.
pub struct EndorsementLedger<S> {
    pub(crate) store: S,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: LedgerConfig,
    pub(crate) retry: RetryPolicy,
}

impl<S: LedgerStore> EndorsementLedger<S> {
    /// Create a ledger with default configuration and the system clock.
    pub fn new(store: S) -> Self {
        let config = LedgerConfig::default();
        Self {
            store,
            clock: Arc::new(SystemClock),
            retry: config.retry_policy(),
            config,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        self.retry = config.retry_policy();
        self.config = config;
        Ok(self)
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

impl<S> std::fmt::Debug for EndorsementLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndorsementLedger")
            .field("config", &self.config)
            .finish()
    }
}
