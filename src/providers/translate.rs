use super::{ProviderError, Translator};
use crate::config::EndpointConfig;
use crate::language::Language;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: String,
}

/// Text translation over a JSON HTTP endpoint.
pub struct HttpTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranslator {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                    .context("Invalid authorization header value")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, ProviderError> {
        let url = format!("{}/translate", self.base_url);
        debug!(
            "Translating {} chars to {} via {}",
            text.len(),
            target.tag(),
            url
        );

        let request = TranslateRequest {
            text,
            target: target.tag(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Service(format!("translation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::Service(format!(
                "translation service returned {}: {}",
                status, detail
            )));
        }

        let body: TranslateResponse = response.json().await.map_err(|e| {
            ProviderError::Service(format!("failed to parse translation response: {}", e))
        })?;

        Ok(body.text)
    }
}
