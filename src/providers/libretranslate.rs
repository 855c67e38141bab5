use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{TranslationBackend, ensure_success, first_successful, http_client};
use crate::app_config::{BackendConfig, BackendKind};
use crate::errors::ProviderError;

// @module: LibreTranslate backend

/// Request body for `POST /translate`
#[derive(Debug, Serialize)]
pub struct LibreRequest<'a> {
    pub q: &'a str,
    pub source: &'a str,
    pub target: &'a str,
    pub format: &'a str,
}

/// Response body of `POST /translate`
#[derive(Debug, Deserialize)]
pub struct LibreResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Backend for public LibreTranslate instances
#[derive(Debug, Clone)]
pub struct LibreTranslateBackend {
    endpoints: Vec<String>,
    client: Client,
}

impl LibreTranslateBackend {
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
        let body = LibreRequest {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
        };

        let response = self.client.post(&endpoint).json(&body).send().await?;
        let parsed: LibreResponse = ensure_success(response).await?.json().await?;

        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslateBackend {
    fn name(&self) -> &str {
        BackendKind::LibreTranslate.display_name()
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
