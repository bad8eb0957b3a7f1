// crates/accolade-ledger/src/weight.rs
//
// Weight Resolver: an endorser's current influence.
//
// Influence is the sum of the weights of every edge the user has received.
// A user who has received nothing still carries a baseline influence of 1,
// so every endorsement counts for something.

use accolade_core::{LedgerError, LedgerTxn, UserId};

/// Influence of a user with no incoming edges.
pub const BASELINE_INFLUENCE: u64 = 1;

/// Map a raw incoming-weight sum to an influence value (always >= 1).
pub fn influence_from_sum(incoming: u64) -> u64 {
    if incoming == 0 {
        BASELINE_INFLUENCE
    } else {
        incoming
    }
}

/// Resolve `user`'s influence against the caller's transaction snapshot.
pub fn resolve(txn: &mut dyn LedgerTxn, user: &UserId) -> Result<u64, LedgerError> {
    Ok(influence_from_sum(txn.incoming_weight(user)?))
}
