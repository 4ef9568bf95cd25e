//! `SQLite`-backed key-value store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::schema::{DELETE_VALUE, SCHEMA_STATEMENTS, SELECT_VALUE, UPSERT_VALUE};
use super::KeyValueStore;
use crate::error::{Error, Result};

/// Durable key-value store kept in a single `SQLite` table.
///
/// Calls run inline on the caller's task; the connection sits behind a mutex
/// only to satisfy the `Sync` bound of [`KeyValueStore`].
#[derive(Debug)]
pub struct SqliteKeyValueStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the table cannot
    /// be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening key-value database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::initialize(&conn)?;

        info!("Key-value database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::initialize(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize(conn: &Connection) -> Result<()> {
        for statement in SCHEMA_STATEMENTS {
            conn.execute(statement, [])?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("key-value connection lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        conn.query_row(SELECT_VALUE, [key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::storage_read(key, e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(UPSERT_VALUE, params![key, value])
            .map_err(|e| Error::storage_write(key, e.to_string()))?;
        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(DELETE_VALUE, [key])
            .map_err(|e| Error::storage_write(key, e.to_string()))?;
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let batch = keys.join(",");
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::storage_write(batch.as_str(), e.to_string()))?;
        for key in keys {
            tx.execute(DELETE_VALUE, [key])
                .map_err(|e| Error::storage_write(*key, e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| Error::storage_write(batch.as_str(), e.to_string()))?;
        Ok(())
    }
}
