// crates/accolade-cli/src/commands/rank.rs
//
// `accolade rank` - show the ranked results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::Tabled;

use accolade_core::RankEntry;

use crate::output::{emit, OutputFormat};
use crate::rpc_client::call;

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Recipient")]
    recipient: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Elected At")]
    elected_at: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct Results {
    results: Vec<RankEntry>,
}

fn rows(results: &Results) -> Vec<RankRow> {
    results
        .results
        .iter()
        .enumerate()
        .map(|(i, e)| RankRow {
            position: i + 1,
            recipient: e.recipient_id.to_string(),
            domain: e.domain.to_string(),
            count: e.count,
            elected_at: e.elected_at.to_rfc3339(),
        })
        .collect()
}

/// Run the rank command.
pub async fn run(
    rpc: &str,
    format: OutputFormat,
    domain: Option<&str>,
    since: Option<DateTime<Utc>>,
    limit: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let results: Results = call(
        rpc,
        "rank/results",
        json!({"domain": domain, "since": since, "limit": limit}),
    )
    .await?;
    emit(format, &results, rows);
    Ok(())
}
