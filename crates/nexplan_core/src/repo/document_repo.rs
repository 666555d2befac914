//! Key/value document storage and its SQLite implementation.
//!
//! # Responsibility
//! - Read and replace serialized documents by key.
//! - Report writes made by other connections as `StorageEvent`s.
//!
//! # Invariants
//! - Every write bumps the key's `revision`.
//! - A handle never reports its own writes as external changes.

use crate::clock::now_epoch_ms;
use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for persisted state reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to serialize document: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
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
        Self::Serialization(value)
    }
}

/// Notification that a key changed outside the current handle.
///
/// `new_value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// Key/value persistence used by the project store.
pub trait DocumentStorage {
    fn load(&self, key: &str) -> RepoResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Returns changes to `key` made elsewhere since the last poll, load or save.
    fn poll_external_changes(&self, key: &str) -> RepoResult<Vec<StorageEvent>>;
}

/// SQLite-backed document storage over the `kv_store` table.
pub struct SqliteDocumentStorage<'conn> {
    conn: &'conn Connection,
    /// Last revision this handle wrote or read per key; `0` means absent.
    seen_revisions: RefCell<HashMap<String, i64>>,
    data_version: Cell<i64>,
}

impl<'conn> SqliteDocumentStorage<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            seen_revisions: RefCell::new(HashMap::new()),
            data_version: Cell::new(read_data_version(conn)?),
        })
    }

    fn remember(&self, key: &str, revision: i64) {
        self.seen_revisions
            .borrow_mut()
            .insert(key.to_string(), revision);
    }

    fn seen_revision(&self, key: &str) -> i64 {
        self.seen_revisions
            .borrow()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn read_entry(&self, key: &str) -> RepoResult<Option<(String, i64)>> {
        let entry = self
            .conn
            .query_row(
                "SELECT value, revision FROM kv_store WHERE key = ?1;",
                [key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(entry)
    }
}

impl DocumentStorage for SqliteDocumentStorage<'_> {
    fn load(&self, key: &str) -> RepoResult<Option<String>> {
        let entry = self.read_entry(key)?;
        self.remember(key, entry.as_ref().map_or(0, |(_, revision)| *revision));
        Ok(entry.map(|(value, _)| value))
    }

    fn save(&self, key: &str, value: &str) -> RepoResult<()> {
        let revision: i64 = self.conn.query_row(
            "INSERT INTO kv_store (key, value, revision, updated_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = kv_store.revision + 1,
                updated_at = excluded.updated_at
             RETURNING revision;",
            params![key, value, now_epoch_ms()],
            |row| row.get(0),
        )?;
        self.remember(key, revision);
        debug!("event=kv_save module=repo status=ok key={key} revision={revision}");
        Ok(())
    }

    fn poll_external_changes(&self, key: &str) -> RepoResult<Vec<StorageEvent>> {
        let current_version = read_data_version(self.conn)?;
        if current_version == self.data_version.get() {
            return Ok(Vec::new());
        }
        self.data_version.set(current_version);

        let seen = self.seen_revision(key);
        let event = match self.read_entry(key)? {
            Some((value, revision)) if revision != seen => {
                self.remember(key, revision);
                Some(StorageEvent {
                    key: key.to_string(),
                    new_value: Some(value),
                })
            }
            None if seen != 0 => {
                self.remember(key, 0);
                Some(StorageEvent {
                    key: key.to_string(),
                    new_value: None,
                })
            }
            _ => None,
        };

        Ok(event.into_iter().collect())
    }
}

fn read_data_version(conn: &Connection) -> RepoResult<i64> {
    let version = conn.query_row("PRAGMA data_version;", [], |row| row.get(0))?;
    Ok(version)
}
