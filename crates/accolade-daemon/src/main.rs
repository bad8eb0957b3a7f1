// crates/accolade-daemon/src/main.rs
//
// Binary entrypoint for the Accolade ledger daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens the
// selected Ledger Store, and serves the ledger over JSON-RPC until Ctrl-C.

mod config;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use config::{DaemonConfig, StorageKind};

use accolade_core::LedgerStore;
use accolade_ledger::EndorsementLedger;
use accolade_rpc::{AccoladeRpcServer, RpcConfig};
use accolade_store::{MemoryStore, RocksStore};

/// Accolade daemon: serves the endorsement ledger over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "accolade-daemon", version = "0.1.0", about = "Accolade endorsement ledger daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.accolade/config.toml")]
    config: String,

    /// Ledger Store backend; overrides the config file.
    #[arg(long, value_enum)]
    storage: Option<StorageKind>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Reported once tracing is up.
    let loaded = DaemonConfig::load(&args.config);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    // Initialize tracing subscriber for structured logging. RUST_LOG wins
    // over the configured level.
    let default_level = daemon_config.log_level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", args.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            args.config,
            e
        ),
    }

    // CLI --storage flag overrides the config file value.
    if let Some(storage) = args.storage {
        daemon_config.storage = storage;
    }

    tracing::info!("Accolade Daemon v0.1.0");
    tracing::info!("Storage: {:?}", daemon_config.storage);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );

    match daemon_config.storage {
        StorageKind::Rocksdb => {
            let data_dir = config::expand_tilde(&daemon_config.data_dir);
            std::fs::create_dir_all(&data_dir)?;
            let db_path = daemon_config.ledger_db_path();
            let store = RocksStore::open(&db_path)
                .map_err(|e| format!("Failed to open RocksDB at {}: {}", db_path, e))?;
            serve(store, &daemon_config).await
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory ledger store; endorsements are lost on exit");
            serve(MemoryStore::new(), &daemon_config).await
        }
    }
}

/// Build the ledger over `store` and serve it until Ctrl-C.
async fn serve<S: LedgerStore + 'static>(
    store: S,
    daemon_config: &DaemonConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Arc::new(EndorsementLedger::new(store).with_config(daemon_config.ledger.clone())?);

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = AccoladeRpcServer::new(rpc_config, ledger).with_start_time(Instant::now());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    rpc_server
        .serve_with_shutdown(shutdown)
        .await
        .map_err(|e| format!("RPC server error: {}", e))?;

    Ok(())
}
