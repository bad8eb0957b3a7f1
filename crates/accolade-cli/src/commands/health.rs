// crates/accolade-cli/src/commands/health.rs
//
// `accolade health` - display daemon status.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::output::{format_json, OutputFormat};
use crate::rpc_client::call;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: String,
    storage: String,
    uptime_secs: u64,
}

/// Run the health command.
pub async fn run(rpc: &str, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let health: Health = call(rpc, "node/health", json!({})).await?;
    match format {
        OutputFormat::Json => println!("{}", format_json(&health)),
        OutputFormat::Table => {
            println!("Accolade daemon");
            println!("---------------");
            println!("  Endpoint: {}", rpc);
            println!("  Status:   {}", health.status);
            println!("  Storage:  {}", health.storage);
            println!("  Uptime:   {}s", health.uptime_secs);
        }
    }
    Ok(())
}
