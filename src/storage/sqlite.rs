use anyhow::Result;
use log::debug;
use rusqlite::{OptionalExtension, params};
use std::path::Path;

use super::{StoreConnection, KeyValueStore};
use crate::errors::StoreError;

/// Key/value store persisted in the `kv_store` table
#[derive(Clone)]
pub struct SqliteStore {
    db: StoreConnection,
}

impl SqliteStore {
    /// Open the store at the default location
    pub fn open_default() -> Result<Self> {
        Ok(Self::with_connection(StoreConnection::open_default()?))
    }

    /// Open the store at a specific path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_connection(StoreConnection::open(path)?))
    }

    /// In-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::with_connection(StoreConnection::open_in_memory()?))
    }

    pub fn with_connection(db: StoreConnection) -> Self {
        Self { db }
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| row.get(0))
                .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
                params![key, value],
            )
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db.with_conn(|conn| conn.execute("DELETE FROM kv_store WHERE key = ?1", [key]))?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        // substr comparison keeps '%' and '_' in prefixes literal
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key FROM kv_store WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
            )?;
            let keys = stmt
                .query_map([prefix], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>();
            keys
        })
    }

    fn remove_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let removed = self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE substr(key, 1, length(?1)) = ?1", [prefix])
        })?;
        debug!("Removed {} stored entries with prefix '{}'", removed, prefix);
        Ok(removed)
    }
}
