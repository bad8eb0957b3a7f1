// crates/accolade-daemon/src/config.rs
//
// Runtime configuration for the Accolade daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use accolade_ledger::LedgerConfig;

/// Ledger Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Durable RocksDB store under `data_dir`.
    Rocksdb,
    /// In-process store; contents are lost on exit.
    Memory,
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Which Ledger Store backend to open.
    #[serde(default = "default_storage")]
    pub storage: StorageKind,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retry, deadline, and ranking tunables.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_data_dir() -> String {
    "~/.accolade/data".to_string()
}

fn default_storage() -> StorageKind {
    StorageKind::Rocksdb
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50061
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Where the RocksDB ledger lives.
    pub fn ledger_db_path(&self) -> String {
        format!("{}/ledger_rocksdb", expand_tilde(&self.data_dir))
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.storage, StorageKind::Rocksdb);
        assert_eq!(config.rpc_port, 50061);
        assert_eq!(config.ledger.max_retries, 8);
        assert_eq!(config.ledger.default_rank_limit, 100);
    }

    #[test]
    fn ledger_table_overrides_individual_fields() {
        let config = DaemonConfig::parse(
            r#"
            storage = "memory"
            rpc_port = 6000

            [ledger]
            max_retries = 3
            default_deadline_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.rpc_port, 6000);
        assert_eq!(config.ledger.max_retries, 3);
        assert_eq!(config.ledger.default_deadline_ms, 0);
        assert_eq!(config.ledger.max_backoff_ms, 200);
    }

    #[test]
    fn unknown_storage_is_rejected() {
        assert!(DaemonConfig::parse(r#"storage = "postgres""#).is_err());
    }

    #[test]
    fn ledger_db_path_sits_under_data_dir() {
        let config = DaemonConfig {
            data_dir: "/var/lib/accolade".to_string(),
            ..DaemonConfig::default()
        };
        assert_eq!(config.ledger_db_path(), "/var/lib/accolade/ledger_rocksdb");
    }

    #[test]
    fn tilde_expands_only_at_start() {
        assert_eq!(expand_tilde("/abs/~/x"), "/abs/~/x");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/data"), format!("{}/data", home.display()));
        }
    }
}
