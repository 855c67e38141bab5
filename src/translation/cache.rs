/*!
 * Translation caching functionality.
 *
 * Two tiers: a process-local map consulted first, and a durable key/value
 * store whose records carry a timestamp. Durable records older than the TTL
 * are ignored on read and left in place.
 */

use chrono::Utc;
use log::{debug, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::app_config::CacheConfig;
use crate::storage::{KeyValueStore, MemoryStore};

/// Prefix shared by every durable cache key
pub const CACHE_KEY_PREFIX: &str = "translation_cache_";

/// Hex digits of the content hash kept in a key
const HASH_PREFIX_LEN: usize = 16;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Value stored in the durable tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheRecord {
    /// Cached translation
    pub translation: String,

    /// Write time, unix milliseconds
    pub timestamp: i64,
}

/// Durable key for a text and language pair
///
/// `translation_cache_<source>-<target>-<first 16 hex digits of sha256(text)>`
pub fn cache_key(text: &str, source_language: &str, target_language: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(text.as_bytes()));
    format!(
        "{}{}-{}-{}",
        CACHE_KEY_PREFIX,
        source_language,
        target_language,
        &digest[..HASH_PREFIX_LEN]
    )
}

/// Translation cache for storing and retrieving translations
#[derive(Clone)]
pub struct TranslationCache {
    /// In-memory tier
    memory: Arc<RwLock<HashMap<String, String>>>,

    /// Durable tier
    store: Arc<dyn KeyValueStore>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,

    /// Maximum age of a durable record, in milliseconds
    ttl_millis: i64,
}

impl TranslationCache {
    /// Create a cache over a durable store
    pub fn new(store: Arc<dyn KeyValueStore>, enabled: bool, ttl_days: u32) -> Self {
        Self {
            memory: Arc::new(RwLock::new(HashMap::new())),
            store,
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
            ttl_millis: i64::from(ttl_days) * MILLIS_PER_DAY,
        }
    }

    /// Create a cache from its configuration section
    pub fn from_config(config: &CacheConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, config.enabled, config.ttl_days)
    }

    /// Enabled cache with a process-local durable tier and the default TTL
    pub fn in_memory() -> Self {
        let config = CacheConfig::default();
        Self::new(Arc::new(MemoryStore::new()), true, config.ttl_days)
    }

    /// Get a translation from the cache
    pub fn get(&self, source_text: &str, source_language: &str, target_language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = cache_key(source_text, source_language, target_language);

        if let Some(translation) = self.memory.read().get(&key).cloned() {
            *self.hits.write() += 1;
            debug!("Cache hit for '{}' ({} -> {})",
                   truncate_text(source_text, 30),
                   source_language,
                   target_language);
            return Some(translation);
        }

        if let Some(record) = self.load_durable(&key) {
            let age = Utc::now().timestamp_millis() - record.timestamp;
            if age < self.ttl_millis {
                self.memory.write().insert(key, record.translation.clone());
                *self.hits.write() += 1;
                debug!("Durable cache hit for '{}' ({} -> {})",
                       truncate_text(source_text, 30),
                       source_language,
                       target_language);
                return Some(record.translation);
            }
            debug!("Ignoring expired cache entry {}", key);
        }

        *self.misses.write() += 1;
        None
    }

    /// Store a translation in both tiers
    pub fn put(&self, source_text: &str, source_language: &str, target_language: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = cache_key(source_text, source_language, target_language);
        self.memory.write().insert(key.clone(), translation.to_string());

        let record = CacheRecord {
            translation: translation.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };

        let written = serde_json::to_string(&record)
            .map_err(crate::errors::StoreError::from)
            .and_then(|json| self.store.set(&key, &json));

        if let Err(e) = written {
            warn!("Failed to persist cache entry {}: {}", key, e);
        }

        debug!("Cached translation for '{}' ({} -> {})",
               truncate_text(source_text, 30),
               source_language,
               target_language);
    }

    fn load_durable(&self, key: &str) -> Option<CacheRecord> {
        match self.store.get(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear both tiers and reset statistics
    ///
    /// Returns the number of durable entries removed.
    pub fn clear(&self) -> usize {
        self.memory.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;

        match self.store.remove_prefix(CACHE_KEY_PREFIX) {
            Ok(removed) => {
                debug!("Translation cache cleared ({} durable entries)", removed);
                removed
            }
            Err(e) => {
                warn!("Failed to clear durable cache: {}", e);
                0
            }
        }
    }

    /// Get the number of entries in the memory tier
    pub fn len(&self) -> usize {
        self.memory.read().len()
    }

    /// Check if the memory tier is empty
    pub fn is_empty(&self) -> bool {
        self.memory.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((pos, _)) => format!("{}...", &text[..pos]),
        None => text.to_string(),
    }
}
