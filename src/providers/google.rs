use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{TranslationBackend, ensure_success, first_successful, http_client};
use crate::app_config::{BackendConfig, BackendKind};
use crate::errors::ProviderError;

// @module: Google Translate web widget backend

/// Backend for the keyless `translate_a/single` endpoint
#[derive(Debug, Clone)]
pub struct GoogleWebBackend {
    endpoints: Vec<String>,
    client: Client,
}

impl GoogleWebBackend {
    // @param endpoints: Mirrors tried in order
    // @param timeout_secs: Per-request timeout
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
        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        parse_response(&body)
    }
}

/// Join the translated segments of a `[[["segment", "source", ...], ...], ...]` body
pub fn parse_response(body: &Value) -> Result<String, ProviderError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::ParseError("missing segment list".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[async_trait]
impl TranslationBackend for GoogleWebBackend {
    fn name(&self) -> &str {
        BackendKind::Google.display_name()
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
