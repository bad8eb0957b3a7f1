// crates/accolade-rpc/src/lib.rs
//
// accolade-rpc: JSON-RPC server and handlers for the Accolade endorsement
// ledger.
//
// Requests travel as JSON envelopes over tonic's HTTP transport; there is
// no protobuf codegen. Each method maps onto one ledger operation.

pub mod handlers;
pub mod middleware;
pub mod server;

// Re-export the main server type for ergonomic access.
pub use handlers::RpcError;
pub use server::{call_path, AccoladeRpcServer, JsonRpcRequest, JsonRpcResponse, RpcConfig};
