//! SQLite blob store for persistence across restarts.

use super::BlobStore;
use crate::error::StoreError;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// SQLite-backed blob store
///
/// Uses WAL (Write-Ahead Logging) so a reader never observes a half-written
/// snapshot.
pub struct SqliteBlobStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteBlobStore {
    /// Open or create a store database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Self::init(conn, path.to_path_buf())
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            reason: e.to_string(),
        })?;

        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, db_path: PathBuf) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS blobs (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, key)
            )",
            [],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Corrupted {
            path: self.db_path.clone(),
        })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            "SELECT value FROM blobs WHERE collection = ? AND key = ?",
            params![collection, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    fn put(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO blobs (collection, key, value, updated_at)
             VALUES (?, ?, ?, ?)",
            params![collection, key, value, Utc::now().timestamp()],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
