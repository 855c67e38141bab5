/*!
 * Schema of the durable store.
 *
 * Everything lives in one `kv_store` table; the cache and the history log
 * keep their JSON records in it under their own key prefixes. The
 * `schema_version` table records which layout the file was created with.
 */

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

/// Layout version written by this build
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        version INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

/// Create the tables of a fresh file, or check that an existing one is readable
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let found = stored_version(conn)?;

    if found > SCHEMA_VERSION {
        bail!(
            "Store was written by a newer version (schema v{}, this build reads v{})",
            found,
            SCHEMA_VERSION
        );
    }
    if found == SCHEMA_VERSION {
        debug!("Store schema is current (v{})", found);
        return Ok(());
    }

    info!("Creating store schema v{}", SCHEMA_VERSION);
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch(CREATE_TABLES).context("Failed to create store tables")?;
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 0 when the file has never been initialized
fn stored_version(conn: &Connection) -> Result<i32> {
    let has_table: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to inspect store schema")?;
    if !has_table {
        return Ok(0);
    }

    let version = conn
        .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| row.get(0))
        .optional()
        .context("Failed to read store schema version")?;
    Ok(version.unwrap_or(0))
}
