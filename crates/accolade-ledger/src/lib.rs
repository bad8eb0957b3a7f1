// crates/accolade-ledger/src/lib.rs
//
// accolade-ledger: the endorsement ledger.
//
// An endorsement carries the endorser's influence at the time it is made:
// the sum of the weights of every edge the endorser has received, or 1 when
// they have received nothing. Re-endorsing the same (endorser, recipient,
// domain) adds to the existing edge. Rankings sum edge weights per
// (recipient, domain).
//
// The ledger is stateless apart from its injected store handle; all shared
// mutable state lives in the Ledger Store.

pub mod config;
pub mod ledger;
pub mod rank;
pub mod reader;
pub mod remover;
pub mod retry;
pub mod weight;
pub mod writer;

#[cfg(test)]
mod testing;

pub use config::LedgerConfig;
pub use ledger::EndorsementLedger;
pub use retry::RetryPolicy;
