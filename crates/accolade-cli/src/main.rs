// crates/accolade-cli/src/main.rs
//
// CLI entrypoint for the Accolade developer tools.
//
// Every subcommand is one JSON-RPC call against a running accolade-daemon.

mod commands;
mod output;
mod rpc_client;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use output::OutputFormat;

/// Accolade CLI: endorse users and inspect the ledger.
#[derive(Parser, Debug)]
#[command(name = "accolade", version = "0.1.0", about = "Accolade endorsement ledger CLI")]
struct Cli {
    /// RPC endpoint for the accolade-daemon.
    #[arg(long, global = true, default_value = "http://localhost:50061")]
    rpc: String,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Endorse a recipient in a domain.
    Endorse {
        /// The acting user.
        #[arg(long = "as")]
        endorser: String,
        recipient: String,
        domain: String,
    },

    /// Withdraw endorsements in a domain (all recipients unless one is given).
    Revoke {
        #[arg(long = "as")]
        endorser: String,
        domain: String,
        /// Only revoke the endorsement of this recipient.
        #[arg(long)]
        recipient: Option<String>,
    },

    /// List endorsements a user has given.
    Given {
        endorser: String,
        #[arg(long)]
        domain: Option<String>,
    },

    /// Summarize endorsements a user has received.
    Received {
        recipient: String,
        #[arg(long)]
        domain: Option<String>,
    },

    /// Show a user's current influence.
    Influence { user: String },

    /// Show the ranking.
    Rank {
        #[arg(long)]
        domain: Option<String>,
        /// Only count endorsements made at or after this RFC 3339 instant.
        #[arg(long)]
        since: Option<DateTime<Utc>>,
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Check that the daemon is up.
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let rpc = cli.rpc.as_str();

    match &cli.command {
        Commands::Endorse {
            endorser,
            recipient,
            domain,
        } => commands::endorsement::endorse(rpc, format, endorser, recipient, domain).await?,
        Commands::Revoke {
            endorser,
            domain,
            recipient,
        } => {
            commands::endorsement::revoke(rpc, format, endorser, domain, recipient.as_deref())
                .await?
        }
        Commands::Given { endorser, domain } => {
            commands::endorsement::given(rpc, format, endorser, domain.as_deref()).await?
        }
        Commands::Received { recipient, domain } => {
            commands::endorsement::received(rpc, format, recipient, domain.as_deref()).await?
        }
        Commands::Influence { user } => {
            commands::endorsement::influence(rpc, format, user).await?
        }
        Commands::Rank {
            domain,
            since,
            limit,
        } => commands::rank::run(rpc, format, domain.as_deref(), *since, *limit).await?,
        Commands::Health => commands::health::run(rpc, format).await?,
    }

    Ok(())
}
