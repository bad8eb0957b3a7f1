// crates/accolade-store/src/rocks.rs
//
// RocksDB-backed Ledger Store using optimistic transactions.
//
// Key format (segments separated by NUL, which identifiers may not contain):
//   - Primary:   `edge:{endorser}\0{domain}\0{recipient}` -> JSON Endorsement
//   - Secondary: `recv:{recipient}\0{domain}\0{endorser}` -> empty (index only)
//   - Counter:   `influence:{user}` -> u64 big-endian, sum of incoming weights
//   - Users:     `user:{id}` -> RFC 3339 first-seen timestamp
//
// The primary key order lets one prefix scan serve both "all edges of an
// endorser" and "edges of an endorser in a domain". The influence counter is
// updated in the same transaction as every edge write or delete; the writer
// reads it with `get_for_update`, so a concurrent change to an endorser's
// influence is detected at commit instead of being silently used stale.

use std::fmt;

use chrono::{DateTime, Utc};
use rocksdb::{ErrorKind, MultiThreaded, OptimisticTransactionDB, Options, Transaction};

use accolade_core::endorsement::{Domain, EdgeKey, Endorsement, UserId};
use accolade_core::error::LedgerError;
use accolade_core::traits::{LedgerStore, LedgerTxn};

type Db = OptimisticTransactionDB<MultiThreaded>;

const SEP: u8 = 0;
const EDGE_PREFIX: &[u8] = b"edge:";
const RECV_PREFIX: &[u8] = b"recv:";
const INFLUENCE_PREFIX: &[u8] = b"influence:";
const USER_PREFIX: &[u8] = b"user:";

// ---------------------------------------------------------------------------
// Key encoding
// ---------------------------------------------------------------------------

fn join(prefix: &[u8], parts: &[&str], trailing_sep: bool) -> Vec<u8> {
    let mut key = prefix.to_vec();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(SEP);
        }
        key.extend_from_slice(part.as_bytes());
    }
    if trailing_sep {
        key.push(SEP);
    }
    key
}

/// `edge:{endorser}\0{domain}\0{recipient}`
fn edge_key(key: &EdgeKey) -> Vec<u8> {
    join(
        EDGE_PREFIX,
        &[key.endorser_id.as_str(), key.domain.as_str(), key.recipient_id.as_str()],
        false,
    )
}

/// `recv:{recipient}\0{domain}\0{endorser}`
fn recv_key(key: &EdgeKey) -> Vec<u8> {
    join(
        RECV_PREFIX,
        &[key.recipient_id.as_str(), key.domain.as_str(), key.endorser_id.as_str()],
        false,
    )
}

/// Prefix covering an endorser's edges, optionally narrowed to one domain.
fn endorser_prefix(endorser: &UserId, domain: Option<&Domain>) -> Vec<u8> {
    match domain {
        Some(d) => join(EDGE_PREFIX, &[endorser.as_str(), d.as_str()], true),
        None => join(EDGE_PREFIX, &[endorser.as_str()], true),
    }
}

/// Prefix covering a recipient's index entries, optionally narrowed to one domain.
fn recipient_prefix(recipient: &UserId, domain: Option<&Domain>) -> Vec<u8> {
    match domain {
        Some(d) => join(RECV_PREFIX, &[recipient.as_str(), d.as_str()], true),
        None => join(RECV_PREFIX, &[recipient.as_str()], true),
    }
}

fn influence_key(user: &UserId) -> Vec<u8> {
    join(INFLUENCE_PREFIX, &[user.as_str()], false)
}

fn user_key(user: &UserId) -> Vec<u8> {
    join(USER_PREFIX, &[user.as_str()], false)
}

/// Recover the edge key from a `recv:` index key.
fn parse_recv_key(raw: &[u8]) -> Result<EdgeKey, LedgerError> {
    let body = raw
        .strip_prefix(RECV_PREFIX)
        .ok_or_else(|| LedgerError::Persistence("malformed recipient index key".to_string()))?;
    let parts: Vec<&[u8]> = body.split(|b| *b == SEP).collect();
    if parts.len() != 3 {
        return Err(LedgerError::Persistence(format!(
            "recipient index key has {} segments, expected 3",
            parts.len()
        )));
    }
    let text = |bytes: &[u8]| {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| LedgerError::Persistence(format!("non-UTF-8 index key: {}", e)))
    };
    Ok(EdgeKey::new(
        UserId::new(text(parts[2])?)?,
        UserId::new(text(parts[0])?)?,
        Domain::new(text(parts[1])?)?,
    ))
}

fn encode_weight(weight: u64) -> [u8; 8] {
    weight.to_be_bytes()
}

fn decode_weight(bytes: &[u8]) -> Result<u64, LedgerError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::Persistence(format!("influence counter has {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

fn decode_edge(bytes: &[u8]) -> Result<Endorsement, LedgerError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn storage_err(op: &str, e: rocksdb::Error) -> LedgerError {
    LedgerError::Persistence(format!("RocksDB {} failed: {}", op, e))
}

/// Commit failures caused by a concurrent writer are retryable conflicts.
fn commit_err(e: rocksdb::Error) -> LedgerError {
    match e.kind() {
        ErrorKind::Busy | ErrorKind::TryAgain => {
            LedgerError::Conflict(format!("commit conflict: {}", e))
        }
        _ => storage_err("commit", e),
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

struct RocksTxn<'db> {
    txn: Transaction<'db, Db>,
}

impl RocksTxn<'_> {
    /// Read a key and register it for conflict detection at commit.
    fn read_tracked(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError> {
        self.txn
            .get_for_update(key, true)
            .map_err(|e| storage_err("get_for_update", e))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), LedgerError> {
        self.txn.put(key, value).map_err(|e| storage_err("put", e))
    }

    fn delete(&self, key: &[u8]) -> Result<(), LedgerError> {
        self.txn.delete(key).map_err(|e| storage_err("delete", e))
    }

    fn write_influence(&self, user: &UserId, total: u64) -> Result<(), LedgerError> {
        let key = influence_key(user);
        if total == 0 {
            self.delete(&key)
        } else {
            self.put(&key, &encode_weight(total))
        }
    }
}

impl LedgerTxn for RocksTxn<'_> {
    fn ensure_user(&mut self, user: &UserId, seen_at: DateTime<Utc>) -> Result<(), LedgerError> {
        let key = user_key(user);
        if self.read_tracked(&key)?.is_none() {
            self.put(&key, seen_at.to_rfc3339().as_bytes())?;
        }
        Ok(())
    }

    fn incoming_weight(&mut self, user: &UserId) -> Result<u64, LedgerError> {
        match self.read_tracked(&influence_key(user))? {
            Some(bytes) => decode_weight(&bytes),
            None => Ok(0),
        }
    }

    fn edge(&mut self, key: &EdgeKey) -> Result<Option<Endorsement>, LedgerError> {
        self.read_tracked(&edge_key(key))?
            .map(|bytes| decode_edge(&bytes))
            .transpose()
    }

    fn put_edge(&mut self, edge: &Endorsement) -> Result<(), LedgerError> {
        let key = edge.key();
        let previous = self.edge(&key)?.map(|e| e.weight).unwrap_or(0);
        let total = self.incoming_weight(&key.recipient_id)?;
        let total = total
            .checked_sub(previous)
            .and_then(|t| t.checked_add(edge.weight))
            .ok_or_else(|| {
                LedgerError::Persistence(format!(
                    "influence counter out of range for {}",
                    key.recipient_id
                ))
            })?;

        self.put(&edge_key(&key), &serde_json::to_vec(edge)?)?;
        self.put(&recv_key(&key), &[])?;
        self.write_influence(&key.recipient_id, total)
    }

    fn delete_edge(&mut self, key: &EdgeKey) -> Result<bool, LedgerError> {
        let existing = match self.edge(key)? {
            Some(e) => e,
            None => return Ok(false),
        };
        let total = self
            .incoming_weight(&key.recipient_id)?
            .checked_sub(existing.weight)
            .ok_or_else(|| {
                LedgerError::Persistence(format!(
                    "influence counter underflow for {}",
                    key.recipient_id
                ))
            })?;

        self.delete(&edge_key(key))?;
        self.delete(&recv_key(key))?;
        self.write_influence(&key.recipient_id, total)?;
        Ok(true)
    }

    fn edges_from(
        &mut self,
        endorser: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        let prefix = endorser_prefix(endorser, domain);
        let mut edges = Vec::new();
        for item in self.txn.prefix_iterator(&prefix) {
            let (key, value) = item.map_err(|e| storage_err("iteration", e))?;
            if !key.starts_with(&prefix) {
                break;
            }
            edges.push(decode_edge(&value)?);
        }
        Ok(edges)
    }
}

// ---------------------------------------------------------------------------
// RocksStore
// ---------------------------------------------------------------------------

/// RocksDB-backed `LedgerStore`.
pub struct RocksStore {
    db: Db,
    path: String,
}

impl fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocksStore").field("path", &self.path).finish()
    }
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = Db::open(&opts, path).map_err(|e| {
            LedgerError::Persistence(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        tracing::info!("Ledger store opened at {}", path);
        Ok(Self {
            db,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Collect decoded values under `prefix`, outside any transaction.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<Endorsement>, LedgerError> {
        let mut edges = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item.map_err(|e| storage_err("iteration", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            edges.push(decode_edge(&value)?);
        }
        Ok(edges)
    }
}

impl LedgerStore for RocksStore {
    fn transact<T, F>(&self, body: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut dyn LedgerTxn) -> Result<T, LedgerError>,
    {
        let mut txn = RocksTxn {
            txn: self.db.transaction(),
        };

        match body(&mut txn) {
            Ok(out) => {
                txn.txn.commit().map_err(commit_err)?;
                Ok(out)
            }
            Err(e) => {
                if let Err(rb) = txn.txn.rollback() {
                    tracing::warn!("Rollback after '{}' failed: {}", e, rb);
                }
                Err(e)
            }
        }
    }

    fn edges_by_endorser(
        &self,
        endorser: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        self.scan_prefix(&endorser_prefix(endorser, domain))
    }

    fn edges_by_recipient(
        &self,
        recipient: &UserId,
        domain: Option<&Domain>,
    ) -> Result<Vec<Endorsement>, LedgerError> {
        let prefix = recipient_prefix(recipient, domain);
        let mut edges = Vec::new();

        for item in self.db.prefix_iterator(&prefix) {
            let (key, _value) = item.map_err(|e| storage_err("iteration", e))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let edge_key = edge_key(&parse_recv_key(&key)?);
            // The edge may have been removed between the index read and this get.
            if let Some(bytes) = self.db.get(&edge_key).map_err(|e| storage_err("get", e))? {
                edges.push(decode_edge(&bytes)?);
            }
        }

        Ok(edges)
    }

    fn scan_edges(&self, domain: Option<&Domain>) -> Result<Vec<Endorsement>, LedgerError> {
        let mut edges = self.scan_prefix(EDGE_PREFIX)?;
        if let Some(d) = domain {
            edges.retain(|e| &e.domain == d);
        }
        Ok(edges)
    }

    fn incoming_weight(&self, user: &UserId) -> Result<u64, LedgerError> {
        match self
            .db
            .get(influence_key(user))
            .map_err(|e| storage_err("get", e))?
        {
            Some(bytes) => decode_weight(&bytes),
            None => Ok(0),
        }
    }

    fn contains_user(&self, user: &UserId) -> Result<bool, LedgerError> {
        Ok(self
            .db
            .get(user_key(user))
            .map_err(|e| storage_err("get", e))?
            .is_some())
    }

    fn backend_name(&self) -> &'static str {
        "rocksdb"
    }
}
