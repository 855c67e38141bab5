/*!
 * Tests for translation cache functionality
 */

use chrono::Utc;
use std::sync::Arc;

use textmill::storage::{KeyValueStore, MemoryStore, SqliteStore};
use textmill::translation::TranslationCache;
use textmill::translation::cache::{CACHE_KEY_PREFIX, CacheRecord, cache_key};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

fn write_record(store: &dyn KeyValueStore, text: &str, translation: &str, age_days: i64) {
    let record = CacheRecord {
        translation: translation.to_string(),
        timestamp: Utc::now().timestamp_millis() - age_days * DAY_MILLIS,
    };
    let json = serde_json::to_string(&record).unwrap();
    store.set(&cache_key(text, "en", "es"), &json).unwrap();
}

#[test]
fn test_cache_put_thenGet_shouldRoundTrip() {
    let cache = TranslationCache::in_memory();
    cache.put("hello", "en", "fr", "bonjour");

    assert_eq!(cache.get("hello", "en", "fr"), Some("bonjour".to_string()));
    assert_eq!(cache.get("hello", "en", "es"), None);
    assert_eq!(cache.get("hello", "de", "fr"), None);
}

#[test]
fn test_cache_get_withFreshDurableEntry_shouldPromote() {
    let store = Arc::new(MemoryStore::new());
    write_record(store.as_ref(), "cat", "gato", 1);

    let cache = TranslationCache::new(store, true, 7);
    assert!(cache.is_empty());
    assert_eq!(cache.get("cat", "en", "es"), Some("gato".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_get_withEightDayOldEntry_shouldBeAbsent() {
    let store = Arc::new(MemoryStore::new());
    write_record(store.as_ref(), "dog", "perro", 8);

    let cache = TranslationCache::new(store, true, 7);
    assert_eq!(cache.get("dog", "en", "es"), None);
    assert!(cache.is_empty());
}

#[test]
fn test_cache_withSqliteStore_shouldSurviveNewCacheInstance() {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());

    TranslationCache::new(store.clone(), true, 7).put("house", "en", "es", "casa");
    let reopened = TranslationCache::new(store, true, 7);

    assert_eq!(reopened.get("house", "en", "es"), Some("casa".to_string()));
}

#[test]
fn test_cache_withDisabled_shouldNeverHit() {
    let cache = TranslationCache::new(Arc::new(MemoryStore::new()), false, 7);
    cache.put("hello", "en", "fr", "bonjour");

    assert_eq!(cache.get("hello", "en", "fr"), None);
    assert!(!cache.is_enabled());
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let cache = TranslationCache::in_memory();
    cache.put("one", "en", "es", "uno");

    cache.get("one", "en", "es");
    cache.get("two", "en", "es");
    cache.get("one", "en", "es");

    let (hits, misses, rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 1);
    assert!((rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_clear_shouldOnlyRemoveCacheKeys() {
    let store = Arc::new(MemoryStore::new());
    store.set("translation_history", "[]").unwrap();

    let cache = TranslationCache::new(store.clone(), true, 7);
    cache.put("a", "en", "es", "x");
    cache.put("b", "en", "es", "y");

    assert_eq!(cache.clear(), 2);
    assert!(cache.is_empty());
    assert_eq!(cache.get("a", "en", "es"), None);
    assert!(store.keys_with_prefix(CACHE_KEY_PREFIX).unwrap().is_empty());
    assert_eq!(store.get("translation_history").unwrap(), Some("[]".to_string()));
}

#[test]
fn test_cache_key_shouldIncludeLanguagesAndHashPrefix() {
    let key = cache_key("hello", "en", "es");
    assert_eq!(key, "translation_cache_en-es-2cf24dba5fb0a30e");
}
