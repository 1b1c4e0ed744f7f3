use super::{ProviderError, SpeechSynthesizer};
use crate::config::EndpointConfig;
use crate::language::Language;
use anyhow::{Context, Result};
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    language: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    /// Base64-encoded audio
    audio: String,
}

/// Speech synthesis over a JSON HTTP endpoint returning base64 audio.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSynthesizer {
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
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
    ) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/synthesize", self.base_url);
        debug!(
            "Synthesizing {} chars as {} via {}",
            text.len(),
            language.tag(),
            url
        );

        let request = SynthesisRequest {
            text,
            language: language.tag(),
            format: "mp3",
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Service(format!("synthesis request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::Service(format!(
                "synthesis service returned {}: {}",
                status, detail
            )));
        }

        let body: SynthesisResponse = response.json().await.map_err(|e| {
            ProviderError::Service(format!("failed to parse synthesis response: {}", e))
        })?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&body.audio)
            .map_err(|e| ProviderError::Service(format!("invalid audio payload: {}", e)))?;

        debug!("Synthesis received: {} bytes", audio.len());

        Ok(audio)
    }
}

/// The single shared output slot for synthesized speech.
///
/// Each synthesis overwrites the previous artifact at a fixed path; playback
/// reads the same path. Only one synthesis is in flight at a time, which the
/// shell's synchronous trigger model guarantees.
pub struct SpeechOutput {
    path: PathBuf,
}

impl SpeechOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Overwrite the slot with a freshly synthesized artifact.
    pub fn write(&self, audio: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
        }

        fs::write(&self.path, audio)
            .with_context(|| format!("Failed to write audio artifact {}", self.path.display()))?;

        info!(
            "Output audio written: {} ({} bytes)",
            self.path.display(),
            audio.len()
        );

        Ok(())
    }
}
