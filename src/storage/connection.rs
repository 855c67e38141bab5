/*!
 * SQLite connection handling for the durable store.
 *
 * Opens the database file (creating its directory when needed), brings the
 * schema up to date and hands out the connection one caller at a time.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::schema;
use crate::errors::StoreError;

const APP_DIR_NAME: &str = "textmill";
const DB_FILE_NAME: &str = "textmill.db";
const IN_MEMORY_PATH: &str = ":memory:";

/// Shared handle to one SQLite connection
#[derive(Clone)]
pub struct StoreConnection {
    // @field: Location of the database file, ":memory:" for in-memory stores
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl StoreConnection {
    /// Open the database in the user's data directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create store directory {:?}", dir))?;
        }

        info!("Using translation store at {:?}", path);
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open store {:?}", path))?;
        Self::prepare(conn, path)
    }

    /// Throwaway database living only as long as this handle
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory translation store");
        let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
        Self::prepare(conn, PathBuf::from(IN_MEMORY_PATH))
    }

    fn prepare(conn: Connection, path: PathBuf) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/textmill/textmill.db`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| anyhow!("No data directory available for the translation store"))?;
        Ok(data_dir.join(APP_DIR_NAME).join(DB_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` while holding the connection lock
    pub fn with_conn<F, T>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let guard = self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(op(&guard)?)
    }
}
