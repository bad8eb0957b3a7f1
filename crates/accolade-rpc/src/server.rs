// crates/accolade-rpc/src/server.rs
//
// RPC server setup: AccoladeRpcServer and RpcConfig.
//
// A single tonic service accepts JSON-encoded requests carrying a method
// name, dispatches to the matching handler, and returns a JSON-encoded
// response. tonic supplies transport and interceptors; there is no proto
// codegen.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use accolade_core::LedgerStore;
use accolade_ledger::EndorsementLedger;

use crate::handlers::{self, RpcError};
use crate::middleware;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50061,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
/// The client sends a method name and a JSON params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "endorsement/submit", "rank/results").
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
    /// Stable error code (if not success), e.g. "not_found".
    #[serde(default)]
    pub code: Option<String>,
}

impl JsonRpcResponse {
    fn ok(value: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(value),
            error: None,
            code: None,
        }
    }

    fn err(err: RpcError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(err.message),
            code: Some(err.code),
        }
    }
}

// ---------------------------------------------------------------------------
// AccoladeRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for the endorsement ledger.
///
/// Holds the shared ledger and exposes it through a tonic server with
/// JSON-RPC dispatching.
pub struct AccoladeRpcServer<S> {
    config: RpcConfig,
    inner: LedgerServiceImpl<S>,
}

impl<S> std::fmt::Debug for AccoladeRpcServer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccoladeRpcServer")
            .field("config", &self.config)
            .finish()
    }
}

impl<S: LedgerStore + 'static> AccoladeRpcServer<S> {
    /// Create a new server over a shared ledger.
    pub fn new(config: RpcConfig, ledger: Arc<EndorsementLedger<S>>) -> Self {
        Self {
            config,
            inner: LedgerServiceImpl {
                ledger,
                start_time: Instant::now(),
            },
        }
    }

    /// Set the daemon start time for uptime calculation.
    pub fn with_start_time(mut self, st: Instant) -> Self {
        self.inner.start_time = st;
        self
    }

    /// Dispatch one request without going through the transport.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.inner.dispatch(request).await
    }

    /// Start the RPC server and serve until the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `signal` resolves, then stop accepting connections and
    /// drain in-flight requests.
    pub async fn serve_with_shutdown<F>(
        &self,
        signal: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("Accolade RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                AccoladeJsonRpcServer::new(self.inner.clone()),
                middleware::logging_interceptor,
            ))
            .serve_with_shutdown(addr, signal)
            .await?;

        tracing::info!("Accolade RPC server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Shared state behind the tonic service, cloned per request.
struct LedgerServiceImpl<S> {
    ledger: Arc<EndorsementLedger<S>>,
    start_time: Instant,
}

impl<S> Clone for LedgerServiceImpl<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            start_time: self.start_time,
        }
    }
}

impl<S: LedgerStore + 'static> LedgerServiceImpl<S> {
    /// Dispatch a JSON-RPC request to the appropriate handler based on the method name.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let ledger = &self.ledger;
        let result = match request.method.as_str() {
            // Endorsements
            "endorsement/submit" => {
                dispatch_handler(request.params, |r| {
                    handlers::endorsement::handle_submit(ledger, r)
                })
                .await
            }
            "endorsement/remove" => {
                dispatch_handler(request.params, |r| {
                    handlers::endorsement::handle_remove(ledger, r)
                })
                .await
            }
            "endorsement/by_endorser" => {
                dispatch_handler(request.params, |r| {
                    handlers::endorsement::handle_by_endorser(ledger, r)
                })
                .await
            }
            "endorsement/for_recipient" => {
                dispatch_handler(request.params, |r| {
                    handlers::endorsement::handle_for_recipient(ledger, r)
                })
                .await
            }
            "endorsement/influence" => {
                dispatch_handler(request.params, |r| {
                    handlers::endorsement::handle_influence(ledger, r)
                })
                .await
            }

            // Ranking
            "rank/results" => {
                dispatch_handler(request.params, |r| handlers::rank::handle_results(ledger, r))
                    .await
            }

            // Node
            "node/health" => {
                let storage = ledger.store().backend_name();
                let start_time = self.start_time;
                dispatch_handler(request.params, |r| async move {
                    handlers::node::handle_get_health(r, storage, start_time).await
                })
                .await
            }

            _ => Err(RpcError::new(
                "unknown_method",
                format!("Unknown method: {}", request.method),
            )),
        };

        match result {
            Ok(value) => JsonRpcResponse::ok(value),
            Err(err) => {
                tracing::debug!("RPC {} failed: {}", request.method, err);
                JsonRpcResponse::err(err)
            }
        }
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
///
/// Missing params are treated as an empty object. Params that fail to
/// deserialize (including labels that fail validation) are `invalid_input`.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, RpcError>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Resp, RpcError>>,
{
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    let request: Req = serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_input(format!("Failed to deserialize request: {}", e)))?;
    let response = handler(request).await?;
    serde_json::to_value(response)
        .map_err(|e| RpcError::internal(format!("Failed to serialize response: {}", e)))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// One service, one implicit method. Request and response bodies are raw
// JSON-encoded JsonRpcRequest/JsonRpcResponse bytes.

/// The tonic service wrapper. Implements the low-level service by
/// accepting bytes, deserializing as JSON-RPC, and dispatching.
pub struct AccoladeJsonRpcServer<S> {
    inner: LedgerServiceImpl<S>,
}

impl<S> Clone for AccoladeJsonRpcServer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> std::fmt::Debug for AccoladeJsonRpcServer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccoladeJsonRpcServer").finish()
    }
}

impl<S> AccoladeJsonRpcServer<S> {
    fn new(inner: LedgerServiceImpl<S>) -> Self {
        Self { inner }
    }
}

impl<S> tonic::server::NamedService for AccoladeJsonRpcServer<S> {
    const NAME: &'static str = "accolade.rpc.LedgerService";
}

/// HTTP path the JSON-RPC service answers on. tonic routes by service name,
/// so clients must POST here rather than to the bare endpoint.
pub fn call_path() -> String {
    format!(
        "/{}/Call",
        <AccoladeJsonRpcServer<()> as tonic::server::NamedService>::NAME
    )
}

impl<S, B> tower_service::Service<http::Request<B>> for AccoladeJsonRpcServer<S>
where
    S: LedgerStore + 'static,
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::err(RpcError::invalid_input(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::err(RpcError::invalid_input(format!(
                        "Invalid JSON-RPC request: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP 200 response carrying the JSON-encoded envelope.
fn build_response(resp: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(resp).unwrap_or_default();
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
