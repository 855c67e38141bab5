/*!
 * Translation history log.
 *
 * A bounded, most-recent-first list of completed file translations kept as
 * a JSON array under a single store key.
 */

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::KeyValueStore;

/// Store key holding the serialized log
pub const HISTORY_KEY: &str = "translation_history";

/// One completed file translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub file_name: String,
    pub source_language: String,
    pub target_language: String,
    /// Completion time, RFC 3339
    pub timestamp: String,
    /// Elapsed wall time, rounded to whole seconds
    pub duration_secs: u64,
    pub chunk_count: usize,
    /// File size in bytes
    pub file_size: u64,
}

impl HistoryEntry {
    /// Entry stamped with the current time
    pub fn new(
        file_name: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        duration_secs: u64,
        chunk_count: usize,
        file_size: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            timestamp: Utc::now().to_rfc3339(),
            duration_secs,
            chunk_count,
            file_size,
        }
    }
}

/// Persistent, capped history of translations
#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn KeyValueStore>, max_entries: usize) -> Self {
        Self { store, max_entries }
    }

    /// All entries, most recent first; unreadable logs are treated as empty
    pub fn entries(&self) -> Vec<HistoryEntry> {
        match self.store.get(HISTORY_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Ignoring unreadable translation history: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load translation history: {}", e);
                Vec::new()
            }
        }
    }

    /// Insert at the front, evicting the oldest entries beyond the cap
    pub fn add(&self, entry: HistoryEntry) {
        let mut entries = self.entries();
        entries.insert(0, entry);
        entries.truncate(self.max_entries);
        self.save(&entries);
    }

    /// Remove every entry
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!("Failed to clear translation history: {}", e);
        }
    }

    fn save(&self, entries: &[HistoryEntry]) {
        let result = serde_json::to_string(entries)
            .map_err(crate::errors::StoreError::from)
            .and_then(|json| self.store.set(HISTORY_KEY, &json));

        if let Err(e) = result {
            warn!("Failed to save translation history: {}", e);
        }
    }
}
