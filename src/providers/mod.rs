//! Provider adapters for the three external capabilities
//!
//! Speech-to-text, translation, and speech synthesis are all opaque remote
//! services. Each adapter is a single request/response call with its own
//! failure modes; nothing here implements signal processing of its own.

mod stt;
mod translate;
mod tts;

pub use stt::HttpSpeechToText;
pub use translate::HttpTranslator;
pub use tts::{HttpSynthesizer, SpeechOutput};

use crate::audio::AudioClip;
use crate::language::Language;
use thiserror::Error;

/// Failure modes shared by the provider boundaries.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The recognizer received audio but could not make out any speech.
    /// Non-fatal: a live session reports it and keeps listening.
    #[error("could not understand the audio")]
    NotUnderstood,
    /// Transport or service-side failure, with the provider's own detail.
    #[error("service error: {0}")]
    Service(String),
}

/// Cloud speech recognition: one utterance or file buffer in, text out.
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language: Language,
    ) -> Result<String, ProviderError>;
}

/// Text translation into the target language.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String, ProviderError>;
}

/// Text-to-speech synthesis; returns encoded audio bytes.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: Language)
        -> Result<Vec<u8>, ProviderError>;
}
