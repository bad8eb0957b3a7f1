// crates/accolade-cli/src/commands/mod.rs
//
// Command module declarations for the Accolade CLI.

pub mod endorsement;
pub mod health;
pub mod rank;
