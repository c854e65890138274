//! Key-value store contract and its SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide the string-keyed persistence boundary the snapshot gateway
//!   writes through.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `put_all` is all-or-nothing: either every entry is written or none is.
//! - Writes are never retried here; failures surface to the caller.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, DbError};
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error for store access and snapshot encoding.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was not migrated to the schema this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Write would exceed the store's capacity.
    QuotaExceeded {
        required_bytes: usize,
        quota_bytes: usize,
    },
    /// Snapshot could not be encoded for storage.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store connection is at schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::QuotaExceeded {
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded: {required_bytes} bytes needed, {quota_bytes} available"
            ),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// String-keyed durable storage.
pub trait KeyValueStore {
    /// Reads one value; `None` when the key was never written.
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    /// Writes every entry atomically.
    fn put_all(&mut self, entries: &[(&str, &str)]) -> RepoResult<()>;

    /// Writes one entry.
    fn put(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.put_all(&[(key, value)])
    }
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens the store file at `path`, creating and migrating it as needed.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Wraps a migrated connection, rejecting connections that are not ready.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1;")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get("value")?)),
            None => Ok(None),
        }
    }

    fn put_all(&mut self, entries: &[(&str, &str)]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Volatile store, optionally capped like a browser storage quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose total key+value size may not exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn size_after(&self, entries: &[(&str, &str)]) -> usize {
        let untouched: usize = self
            .entries
            .iter()
            .filter(|(key, _)| !entries.iter().any(|(next, _)| *next == key.as_str()))
            .map(|(key, value)| key.len() + value.len())
            .sum();
        let written: usize = entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum();
        untouched + written
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_all(&mut self, entries: &[(&str, &str)]) -> RepoResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let required_bytes = self.size_after(entries);
            if required_bytes > quota_bytes {
                return Err(RepoError::QuotaExceeded {
                    required_bytes,
                    quota_bytes,
                });
            }
        }
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'kv_store'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable("kv_store"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, RepoError};

    #[test]
    fn memory_store_overwrites_values() {
        let mut store = MemoryKeyValueStore::new();
        store.put("notes", "[]").unwrap();
        store.put("notes", "[1]").unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn quota_rejects_whole_batch() {
        let mut store = MemoryKeyValueStore::with_quota(16);
        store.put("a", "1234").unwrap();

        let err = store
            .put_all(&[("a", "12"), ("b", "0123456789abcdef")])
            .unwrap_err();
        assert!(matches!(err, RepoError::QuotaExceeded { quota_bytes: 16, .. }));
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1234"));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn quota_counts_replaced_values_once() {
        let mut store = MemoryKeyValueStore::with_quota(10);
        store.put("key", "1234567").unwrap();
        store.put("key", "7654321").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("7654321"));
    }
}
