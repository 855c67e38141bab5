use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{TranslationBackend, ensure_success, first_successful, http_client};
use crate::app_config::{BackendConfig, BackendKind};
use crate::errors::ProviderError;

// @module: Lingva backend

#[derive(Debug, Deserialize)]
struct LingvaResponse {
    translation: String,
}

/// Backend for public Lingva instances
#[derive(Debug, Clone)]
pub struct LingvaBackend {
    endpoints: Vec<String>,
    client: Client,
}

impl LingvaBackend {
    pub fn new(endpoints: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            endpoints,
            client: http_client(timeout_secs),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.endpoints.clone(), config.timeout_secs)
    }

    async fn request(
        &self,
        endpoint: String,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let url = build_url(&endpoint, text, source_language, target_language)?;
        let response = self.client.get(url).send().await?;
        let parsed: LingvaResponse = ensure_success(response).await?.json().await?;

        Ok(parsed.translation)
    }
}

/// `<instance>/<source>/<target>/<percent-encoded text>`
pub fn build_url(
    instance: &str,
    text: &str,
    source_language: &str,
    target_language: &str,
) -> Result<Url, ProviderError> {
    let mut url = Url::parse(instance)
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid instance URL {}: {}", instance, e)))?;

    url.path_segments_mut()
        .map_err(|_| ProviderError::RequestFailed(format!("Instance URL cannot be a base: {}", instance)))?
        .pop_if_empty()
        .push(source_language)
        .push(target_language)
        .push(text);

    Ok(url)
}

#[async_trait]
impl TranslationBackend for LingvaBackend {
    fn name(&self) -> &str {
        BackendKind::Lingva.display_name()
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        first_successful(self.name(), &self.endpoints, |endpoint| {
            self.request(endpoint, text, source_language, target_language)
        })
        .await
    }
}
