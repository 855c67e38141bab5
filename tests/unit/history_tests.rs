/*!
 * Tests for the translation history log
 */

use std::sync::Arc;

use textmill::storage::{KeyValueStore, SqliteStore};
use textmill::translation::history::HISTORY_KEY;
use textmill::translation::{HistoryEntry, HistoryLog};

use crate::common::memory_store;

fn entry(index: usize) -> HistoryEntry {
    HistoryEntry::new(format!("file{}.txt", index), "en", "es", 2, 3, 1024)
}

#[test]
fn test_add_withElevenEntries_shouldEvictOldest() {
    let log = HistoryLog::new(memory_store(), 10);
    for i in 0..11 {
        log.add(entry(i));
    }

    let entries = log.entries();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0].file_name, "file10.txt");
    assert_eq!(entries[9].file_name, "file1.txt");
    assert!(entries.iter().all(|e| e.file_name != "file0.txt"));
}

#[test]
fn test_entries_shouldPersistAsJsonArray() {
    let store = memory_store();
    let log = HistoryLog::new(store.clone(), 10);
    log.add(entry(1));

    let json = store.get(HISTORY_KEY).unwrap().unwrap();
    let parsed: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, log.entries());
}

#[test]
fn test_entries_withSqliteStore_shouldSurviveNewLog() {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    HistoryLog::new(store.clone(), 10).add(entry(7));

    let reopened = HistoryLog::new(store, 10);
    let entries = reopened.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].chunk_count, 3);
    assert_eq!(entries[0].file_size, 1024);

    reopened.clear();
    assert!(reopened.entries().is_empty());
}

#[test]
fn test_entries_withUnreadableValue_shouldBeEmpty() {
    let store = memory_store();
    store.set(HISTORY_KEY, "not json").unwrap();

    assert!(HistoryLog::new(store, 10).entries().is_empty());
}
