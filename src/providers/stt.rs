use super::{ProviderError, SpeechToText};
use crate::audio::AudioClip;
use crate::config::SpeechServiceConfig;
use crate::language::Language;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Speech recognition over a Whisper-style HTTP transcription endpoint.
///
/// The utterance is uploaded as an in-memory WAV; the response body is the
/// plain transcription text.
pub struct HttpSpeechToText {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpSpeechToText {
    pub fn new(config: &SpeechServiceConfig) -> Result<Self> {
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
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SpeechToText for HttpSpeechToText {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language: Language,
    ) -> Result<String, ProviderError> {
        let wav_data = audio
            .to_wav_bytes()
            .map_err(|e| ProviderError::Service(format!("failed to encode audio: {}", e)))?;

        let audio_part = Part::bytes(wav_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ProviderError::Service(format!("failed to build audio part: {}", e)))?;

        let form = Form::new()
            .part("file", audio_part)
            .text("model", self.model.clone())
            .text("language", language.tag())
            .text("response_format", "text");

        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!(
            "Submitting {:.1}s of audio to {} (language: {})",
            audio.duration_seconds(),
            url,
            language.tag()
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Service(format!("speech request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ProviderError::NotUnderstood);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::Service(format!(
                "speech service returned {}: {}",
                status, detail
            )));
        }

        let transcription = response
            .text()
            .await
            .map_err(|e| ProviderError::Service(format!("failed to read transcription: {}", e)))?;

        let transcription = transcription.trim().to_string();
        if transcription.is_empty() {
            return Err(ProviderError::NotUnderstood);
        }

        debug!("Transcription received: {} chars", transcription.len());

        Ok(transcription)
    }
}
