// crates/accolade-rpc/src/middleware.rs
//
// Request interceptors for the RPC server.

use tonic::{Request, Status};

/// Logs the metadata of every incoming request at debug level.
///
/// The ledger has no authentication; the caller-supplied `endorser_id` is
/// trusted as the acting user.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    tracing::debug!("Incoming RPC request: {:?}", req.metadata());
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interceptor_passes_requests_through() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert("x-client", "accolade-cli".parse().unwrap());
        let out = logging_interceptor(req).unwrap();
        assert_eq!(out.metadata().get("x-client").unwrap(), "accolade-cli");
    }
}
