// crates/accolade-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the accolade-daemon HTTP endpoint.

use accolade_rpc::{call_path, JsonRpcRequest, JsonRpcResponse};

/// Full URL of the daemon's JSON-RPC service under `endpoint`.
pub fn service_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), call_path())
}

/// Send a JSON-RPC call to the daemon and return the parsed response.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(service_url(endpoint))
        .json(&request)
        .send()
        .await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// Call `method` and decode its result, turning a failed envelope into an
/// error carrying the server's code and message.
pub async fn call<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<T, Box<dyn std::error::Error>> {
    let response = rpc_call(endpoint, method, params).await?;
    Ok(unwrap_result(response)?)
}

/// Extract the typed result from a response envelope.
pub fn unwrap_result<T: serde::de::DeserializeOwned>(
    response: JsonRpcResponse,
) -> Result<T, String> {
    if !response.success {
        return Err(format!(
            "{}: {}",
            response.code.as_deref().unwrap_or("error"),
            response.error.as_deref().unwrap_or("request failed")
        ));
    }
    let value = response.result.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value).map_err(|e| format!("Unexpected response shape: {}", e))
}
