// crates/accolade-store/src/lib.rs
//
// accolade-store: Ledger Store backends for Accolade.
//
// Provides a RocksDB-backed store using optimistic transactions (durable,
// conflict-detecting) and an in-memory store that serializes transactions
// behind a mutex (tests and local development). Both implement the
// `LedgerStore` / `LedgerTxn` traits from accolade-core.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;
