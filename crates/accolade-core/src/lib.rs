// crates/accolade-core/src/lib.rs
//
// accolade-core: Core types, errors, and storage traits for the Accolade
// endorsement ledger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the endorsement edge, ranking and recipient views, the error
// taxonomy, deadlines, and the narrow repository interface that every
// Ledger Store backend implements.

pub mod clock;
pub mod deadline;
pub mod endorsement;
pub mod error;
pub mod rank;
pub mod recipient;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use accolade_core::Endorsement;`

// Endorsement types
pub use endorsement::{Domain, EdgeKey, Endorsement, EndorsementView, UserId};

// Ranking types
pub use rank::{RankEntry, RankQuery};

// Recipient aggregate
pub use recipient::RecipientSummary;

// Time
pub use clock::{Clock, SystemClock};
pub use deadline::Deadline;

// Error type
pub use error::LedgerError;

// Traits
pub use traits::{LedgerStore, LedgerTxn};
