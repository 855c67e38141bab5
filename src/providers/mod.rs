/*!
 * Backend implementations for the translation services.
 *
 * Every backend speaks to one public, unauthenticated translation service
 * and owns an ordered list of equivalent mirrors:
 * - Google: the Google Translate web widget endpoint
 * - LibreTranslate: public LibreTranslate instances
 * - Lingva: public Lingva instances
 * - Mock: scripted backend for tests and benchmarks
 */

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use crate::app_config::{BackendConfig, BackendKind};
use crate::errors::ProviderError;

pub mod google;
pub mod libretranslate;
pub mod lingva;
pub mod mock;

pub use google::GoogleWebBackend;
pub use libretranslate::LibreTranslateBackend;
pub use lingva::LingvaBackend;
pub use mock::MockBackend;

/// Common trait for all translation backends
///
/// This trait defines the interface that all backend implementations must follow,
/// allowing them to be chained in priority order by the provider chain.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Display name used in logs
    fn name(&self) -> &str;

    /// Translate `text` from `source_language` (possibly `auto`) to `target_language`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text, or an error once
    ///   every mirror of the backend has failed
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the configured backends in priority order
pub fn build_backends(configs: &[BackendConfig]) -> Vec<Box<dyn TranslationBackend>> {
    configs
        .iter()
        .map(|config| -> Box<dyn TranslationBackend> {
            match config.kind {
                BackendKind::Google => Box::new(GoogleWebBackend::from_config(config)),
                BackendKind::LibreTranslate => Box::new(LibreTranslateBackend::from_config(config)),
                BackendKind::Lingva => Box::new(LingvaBackend::from_config(config)),
            }
        })
        .collect()
}

/// HTTP client with the backend's timeout
pub(crate) fn http_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Turn a non-success status into an `ApiError`
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());

    Err(ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}

/// Try each mirror in order and return the first non-empty result
pub(crate) async fn first_successful<F, Fut>(
    backend: &str,
    endpoints: &[String],
    mut request: F,
) -> Result<String, ProviderError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    for endpoint in endpoints {
        match request(endpoint.clone()).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!("{} answered from {}", backend, endpoint);
                return Ok(text);
            }
            Ok(_) => warn!("{} mirror {} failed: {}", backend, endpoint, ProviderError::EmptyTranslation),
            Err(e) => warn!("{} mirror {} failed: {}", backend, endpoint, e),
        }
    }

    Err(ProviderError::AllEndpointsFailed {
        backend: backend.to_string(),
        count: endpoints.len(),
    })
}
