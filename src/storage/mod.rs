/*!
 * Durable key/value storage.
 *
 * The translation cache and the history log persist their records through
 * the `KeyValueStore` trait. Two stores are provided:
 * - `MemoryStore`: process-local, used by tests and `--no-persist`
 * - `SqliteStore`: SQLite-backed, the default for the command line
 */

pub mod schema;
pub mod connection;
pub mod memory;
pub mod sqlite;

pub use connection::StoreConnection;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::StoreError;

/// Synchronous string key/value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace a value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Remove every key starting with `prefix`, returning how many were removed
    fn remove_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let keys = self.keys_with_prefix(prefix)?;
        for key in &keys {
            self.remove(key)?;
        }
        Ok(keys.len())
    }
}
