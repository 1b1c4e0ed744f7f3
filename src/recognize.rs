use crate::audio::{extract_audio_track, AudioFile};
use crate::language::Language;
use crate::providers::SpeechToText;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// One-shot recognition of pre-recorded audio and video files.
///
/// Unlike the live capture session there is no loop and no cancellation:
/// each call produces a single transcript or a single error, and is never
/// retried automatically.
pub struct FileRecognizer {
    speech: Arc<dyn SpeechToText>,
    temp_dir: PathBuf,
}

impl FileRecognizer {
    pub fn new(speech: Arc<dyn SpeechToText>, temp_dir: PathBuf) -> Self {
        Self { speech, temp_dir }
    }

    /// Recognize a complete audio file.
    pub async fn recognize_audio_file(&self, path: &Path, language: Language) -> Result<String> {
        info!("Recognizing audio file: {}", path.display());

        let owned = path.to_path_buf();
        let audio = tokio::task::spawn_blocking(move || AudioFile::open(&owned))
            .await
            .context("Audio decode task failed")??;

        let clip = audio.into_clip();
        let text = self
            .speech
            .transcribe(&clip, language)
            .await
            .with_context(|| format!("Recognition failed for {}", path.display()))?;

        info!("Recognized {} chars from {}", text.len(), path.display());

        Ok(text)
    }

    /// Recognize the audio track of a video file.
    ///
    /// The track is extracted into a temporary buffer that is deleted when
    /// this call returns, whether recognition succeeded or failed.
    pub async fn recognize_video_file(&self, path: &Path, language: Language) -> Result<String> {
        info!("Recognizing video file: {}", path.display());

        let video = path.to_path_buf();
        let temp_dir = self.temp_dir.clone();
        let extracted =
            tokio::task::spawn_blocking(move || extract_audio_track(&video, &temp_dir))
                .await
                .context("Audio extraction task failed")??;

        // The guard deletes the extracted buffer as soon as this scope ends.
        self.recognize_audio_file(extracted.path(), language).await
    }
}
