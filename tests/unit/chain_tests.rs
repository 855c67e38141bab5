/*!
 * Tests for the provider chain and the offline fallback
 */

use std::time::Duration;

use textmill::app_config::TranslationCommonConfig;
use textmill::providers::{MockBackend, TranslationBackend};
use textmill::translation::chain::{MAX_BACKOFF_MS, backoff_delay};
use textmill::translation::fallback::{self, UNAVAILABLE_MARKER};
use textmill::translation::{ProviderChain, TranslationCache};

use crate::common::{chain_with, init_test_logging};

#[tokio::test]
async fn test_translate_withEmptyText_shouldNotContactBackends() {
    let backend = MockBackend::working();
    let chain = chain_with(vec![Box::new(backend.clone())]);

    assert_eq!(chain.translate("", "en", "es").await, "");
    assert_eq!(chain.translate(" \t\n", "en", "es").await, " \t\n");
    assert_eq!(backend.request_count(), 0);
    assert_eq!(chain.cache().stats().0 + chain.cache().stats().1, 0);
}

#[tokio::test]
async fn test_translate_withAllBackendsFailing_shouldUseDictionaryFallback() {
    init_test_logging();
    let first = MockBackend::failing().with_name("first");
    let second = MockBackend::empty().with_name("second");
    let chain = chain_with(vec![Box::new(first.clone()), Box::new(second.clone())]);

    assert_eq!(chain.translate("hello", "en", "es").await, "hola");

    // three full passes over the chain
    assert_eq!(first.request_count(), 3);
    assert_eq!(second.request_count(), 3);
    assert!(chain.cache().is_empty());
}

#[tokio::test]
async fn test_translate_withUnsupportedPair_shouldMarkUnavailable() {
    let chain = chain_with(vec![Box::new(MockBackend::failing())]);

    let result = chain.translate("hello", "en", "ja").await;
    assert_eq!(result, format!("{}hello", UNAVAILABLE_MARKER));
}

#[tokio::test]
async fn test_translate_withIntermittentBackend_shouldRecoverOnRetry() {
    // every second request fails; the first request succeeds
    let backend = MockBackend::intermittent(2);
    let chain = chain_with(vec![Box::new(backend.clone())]);

    assert_eq!(chain.translate("one", "en", "es").await, "[TRANSLATED to es] one");
    assert_eq!(chain.translate("two", "en", "es").await, "[TRANSLATED to es] two");
    assert_eq!(backend.request_count(), 3);
}

#[tokio::test]
async fn test_translate_shouldPreferEarlierBackends() {
    let first = MockBackend::working().with_name("first");
    let second = MockBackend::working().with_name("second");
    let chain = chain_with(vec![Box::new(first.clone()), Box::new(second.clone())]);

    chain.translate("hello", "en", "fr").await;
    assert_eq!(first.request_count(), 1);
    assert_eq!(second.request_count(), 0);
    assert_eq!(chain.backend_names(), vec!["first", "second"]);
}

#[tokio::test]
async fn test_translate_withCacheHit_shouldSkipBackends() {
    let backend = MockBackend::working();
    let cache = TranslationCache::in_memory();
    cache.put("hello", "en", "es", "hola (cached)");

    let options = TranslationCommonConfig {
        rate_limit_delay_ms: 0,
        retry_count: 1,
        retry_backoff_ms: 0,
        max_request_chars: 5000,
    };
    let backends: Vec<Box<dyn TranslationBackend>> = vec![Box::new(backend.clone())];
    let chain = ProviderChain::new(backends, cache, options);

    assert_eq!(chain.translate("hello", "en", "es").await, "hola (cached)");
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_translate_shouldWaitBetweenAttempts() {
    let backend = MockBackend::failing();
    let options = TranslationCommonConfig {
        rate_limit_delay_ms: 0,
        retry_count: 3,
        retry_backoff_ms: 20,
        max_request_chars: 5000,
    };
    let chain = ProviderChain::new(vec![Box::new(backend.clone())], TranslationCache::in_memory(), options);

    let start = std::time::Instant::now();
    chain.translate("hello", "en", "de").await;

    // 40ms after the first attempt, 80ms after the second
    assert!(start.elapsed() >= Duration::from_millis(120));
    assert_eq!(backend.request_count(), 3);
}

#[test]
fn test_backoff_delay_shouldDoubleFromTwiceTheBase() {
    assert_eq!(backoff_delay(200, 1), Duration::from_millis(400));
    assert_eq!(backoff_delay(200, 2), Duration::from_millis(800));
    assert_eq!(backoff_delay(0, 5), Duration::ZERO);
}

#[test]
fn test_backoff_delay_withHugeAttempt_shouldStayCapped() {
    assert_eq!(backoff_delay(500, 70), Duration::from_millis(MAX_BACKOFF_MS));
    assert_eq!(backoff_delay(u64::MAX, 3), Duration::from_millis(MAX_BACKOFF_MS));
}

#[tokio::test]
async fn test_translate_withManyAttempts_shouldStillFallBack() {
    let backend = MockBackend::failing();
    let options = TranslationCommonConfig {
        rate_limit_delay_ms: 0,
        retry_count: 70,
        retry_backoff_ms: 0,
        max_request_chars: 5000,
    };
    let chain = ProviderChain::new(vec![Box::new(backend.clone())], TranslationCache::in_memory(), options);

    assert_eq!(chain.translate("hello", "en", "es").await, "hola");
    assert_eq!(backend.request_count(), 70);
}

#[test]
fn test_fallback_shouldPreferPhrasesAndKeepUnknownWords() {
    assert_eq!(fallback::translate("Thank you, Zorblax", "en", "es"), "gracias, Zorblax");
    assert_eq!(fallback::translate("Thank you and goodbye", "en", "fr"), "merci et au revoir");
    assert_eq!(fallback::translate("without milk", "en", "de"), "ohne milk");
    assert_eq!(fallback::translate("hello", "es", "en"), format!("{}hello", UNAVAILABLE_MARKER));
}
