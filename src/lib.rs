pub mod audio;
pub mod config;
pub mod http;
pub mod language;
pub mod providers;
pub mod recognize;
pub mod session;

pub use audio::{
    extract_audio_track, AudioClip, AudioFile, AudioInput, AudioInputFactory, CaptureError,
    InputConfig, MicrophoneFactory,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use language::Language;
pub use providers::{
    HttpSpeechToText, HttpSynthesizer, HttpTranslator, ProviderError, SpeechOutput,
    SpeechSynthesizer, SpeechToText, Translator,
};
pub use recognize::FileRecognizer;
pub use session::{CaptureController, SessionConfig, SessionStats, TranscriptEntry, TranscriptEvent};
