use crate::config::CaptureConfig;
use crate::providers::{SpeechOutput, SpeechSynthesizer, Translator};
use crate::recognize::FileRecognizer;
use crate::session::CaptureController;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live capture session controller (at most one active session)
    pub controller: Arc<CaptureController>,

    /// One-shot file/video recognition
    pub recognizer: Arc<FileRecognizer>,

    /// Translation provider adapter
    pub translator: Arc<dyn Translator>,

    /// Speech synthesis provider adapter
    pub synthesizer: Arc<dyn SpeechSynthesizer>,

    /// Shared output slot for synthesized speech
    pub output: Arc<SpeechOutput>,

    /// Capture defaults applied to new sessions
    pub capture: CaptureConfig,
}

impl AppState {
    pub fn new(
        controller: Arc<CaptureController>,
        recognizer: Arc<FileRecognizer>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output: Arc<SpeechOutput>,
        capture: CaptureConfig,
    ) -> Self {
        Self {
            controller,
            recognizer,
            translator,
            synthesizer,
            output,
            capture,
        }
    }
}
