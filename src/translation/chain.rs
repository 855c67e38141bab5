/*!
 * Priority-ordered provider chain.
 *
 * A chunk goes through the cache, then each backend in order, repeating the
 * whole chain with exponential backoff, and finally the offline fallback.
 * The chain never fails: the worst outcome is fallback output.
 */

use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;

use super::cache::TranslationCache;
use super::fallback;
use crate::app_config::{Config, TranslationCommonConfig};
use crate::providers::{TranslationBackend, build_backends};
use crate::storage::KeyValueStore;

/// Longest single wait between two passes over the chain
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Backends, cache and retry policy for translating single chunks
pub struct ProviderChain {
    /// Backends in priority order
    backends: Vec<Box<dyn TranslationBackend>>,

    /// Two-tier translation cache
    cache: TranslationCache,

    /// Delays, attempt count and request size limit
    options: TranslationCommonConfig,
}

impl ProviderChain {
    /// Create a chain from explicit parts
    pub fn new(
        backends: Vec<Box<dyn TranslationBackend>>,
        cache: TranslationCache,
        options: TranslationCommonConfig,
    ) -> Self {
        Self {
            backends,
            cache,
            options,
        }
    }

    /// Create the configured chain over a durable store
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            build_backends(&config.translation.backends),
            TranslationCache::from_config(&config.cache, store),
            config.translation.common.clone(),
        )
    }

    /// The cache consulted before any backend
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Names of the backends in priority order
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Translate one piece of text
    ///
    /// Whitespace-only text is returned as is. Backend output is cached;
    /// fallback output is not.
    pub async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        if let Some(cached) = self.cache.get(text, source_language, target_language) {
            return cached;
        }

        let request_text = truncate_chars(text, self.options.max_request_chars);
        let attempts = self.options.retry_count.max(1);

        for attempt in 1..=attempts {
            if let Some(translation) = self.try_backends(&request_text, source_language, target_language).await {
                self.cache.put(text, source_language, target_language, &translation);

                if self.options.rate_limit_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.options.rate_limit_delay_ms)).await;
                }

                return translation;
            }

            if attempt < attempts {
                let backoff = backoff_delay(self.options.retry_backoff_ms, attempt);
                warn!(
                    "All backends failed (attempt {}/{}), retrying in {}ms",
                    attempt,
                    attempts,
                    backoff.as_millis()
                );
                tokio::time::sleep(backoff).await;
            }
        }

        error!("All backends failed after {} attempts, using offline fallback", attempts);
        fallback::translate(text, source_language, target_language)
    }

    /// One pass over the backends; `None` when none produced a usable result
    async fn try_backends(&self, text: &str, source_language: &str, target_language: &str) -> Option<String> {
        for backend in &self.backends {
            match backend.translate(text, source_language, target_language).await {
                Ok(translation) if is_usable(&translation, text) => {
                    debug!("Translated {} chars with {}", text.chars().count(), backend.name());
                    return Some(translation);
                }
                Ok(_) => warn!("{} returned an empty or unchanged translation", backend.name()),
                Err(e) => warn!("{} failed: {}", backend.name(), e),
            }
        }

        None
    }
}

/// Wait after failed attempt `attempt` (1-based): `base * 2^attempt`, capped
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

/// Empty results and results equal to the input do not count as translations
fn is_usable(translation: &str, sent: &str) -> bool {
    let trimmed = translation.trim();
    !trimmed.is_empty() && trimmed != sent.trim()
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((pos, _)) => text[..pos].to_string(),
        None => text.to_string(),
    }
}
