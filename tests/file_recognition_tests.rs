// Integration tests for one-shot file and video recognition
//
// The speech provider is faked at the trait seam; the decode and
// extraction paths run for real against generated WAV fixtures. The video
// tests lean on the extractor being container-agnostic: a WAV file is a
// valid single-track container for it.

use async_trait::async_trait;
use parla::{
    extract_audio_track, AudioClip, FileRecognizer, Language, ProviderError, SpeechToText,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write_tone_wav(path: &Path, sample_rate: u32, seconds: f64) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let frames = (sample_rate as f64 * seconds) as usize;
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = (8000.0 * (2.0 * std::f64::consts::PI * 220.0 * t).sin()) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;

    Ok(())
}

fn stray_files(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

struct FixedSpeech {
    text: &'static str,
}

#[async_trait]
impl SpeechToText for FixedSpeech {
    async fn transcribe(
        &self,
        _audio: &AudioClip,
        _language: Language,
    ) -> Result<String, ProviderError> {
        Ok(self.text.to_string())
    }
}

struct RefusingSpeech;

#[async_trait]
impl SpeechToText for RefusingSpeech {
    async fn transcribe(
        &self,
        _audio: &AudioClip,
        _language: Language,
    ) -> Result<String, ProviderError> {
        Err(ProviderError::NotUnderstood)
    }
}

struct FailingSpeech;

#[async_trait]
impl SpeechToText for FailingSpeech {
    async fn transcribe(
        &self,
        _audio: &AudioClip,
        _language: Language,
    ) -> Result<String, ProviderError> {
        Err(ProviderError::Service("gateway timeout".to_string()))
    }
}

#[tokio::test]
async fn recognize_audio_file_returns_transcript() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("speech.wav");
    write_tone_wav(&path, 16000, 0.5)?;

    let speech: Arc<dyn SpeechToText> = Arc::new(FixedSpeech { text: "hello world" });
    let recognizer = FileRecognizer::new(speech, dir.path().join("tmp"));

    let text = recognizer
        .recognize_audio_file(&path, Language::English)
        .await?;
    assert_eq!(text, "hello world");

    Ok(())
}

#[tokio::test]
async fn recognize_audio_file_reports_missing_file_once() {
    let speech: Arc<dyn SpeechToText> = Arc::new(FixedSpeech { text: "unused" });
    let recognizer = FileRecognizer::new(speech, PathBuf::from("/tmp/parla-tests"));

    let result = recognizer
        .recognize_audio_file(Path::new("/nonexistent/audio.wav"), Language::English)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn not_understood_surfaces_as_a_single_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("mumble.wav");
    write_tone_wav(&path, 16000, 0.2)?;

    let speech: Arc<dyn SpeechToText> = Arc::new(RefusingSpeech);
    let recognizer = FileRecognizer::new(speech, dir.path().join("tmp"));

    let err = recognizer
        .recognize_audio_file(&path, Language::English)
        .await
        .expect_err("refused audio must error");

    assert!(format!("{:#}", err).contains("could not understand"));

    Ok(())
}

#[tokio::test]
async fn video_recognition_removes_extracted_buffer_on_success() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let video = dir.path().join("lecture.wav");
    write_tone_wav(&video, 16000, 0.5)?;

    let temp_dir = TempDir::new()?;
    let speech: Arc<dyn SpeechToText> = Arc::new(FixedSpeech { text: "extracted" });
    let recognizer = FileRecognizer::new(speech, temp_dir.path().to_path_buf());

    let text = recognizer
        .recognize_video_file(&video, Language::Italian)
        .await?;
    assert_eq!(text, "extracted");

    assert_eq!(
        stray_files(temp_dir.path()),
        0,
        "extracted buffer must be gone after recognition"
    );

    Ok(())
}

#[tokio::test]
async fn video_recognition_removes_extracted_buffer_on_failure() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let video = dir.path().join("lecture.wav");
    write_tone_wav(&video, 16000, 0.5)?;

    let temp_dir = TempDir::new()?;
    let speech: Arc<dyn SpeechToText> = Arc::new(FailingSpeech);
    let recognizer = FileRecognizer::new(speech, temp_dir.path().to_path_buf());

    let result = recognizer
        .recognize_video_file(&video, Language::English)
        .await;
    assert!(result.is_err());

    assert_eq!(
        stray_files(temp_dir.path()),
        0,
        "extracted buffer must be gone even when recognition fails"
    );

    Ok(())
}

#[tokio::test]
async fn corrupt_video_reports_one_error_and_leaves_nothing_behind() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let video = dir.path().join("broken.mp4");
    std::fs::write(&video, b"not a real container")?;

    let temp_dir = TempDir::new()?;
    let speech: Arc<dyn SpeechToText> = Arc::new(FixedSpeech { text: "unused" });
    let recognizer = FileRecognizer::new(speech, temp_dir.path().to_path_buf());

    let result = recognizer
        .recognize_video_file(&video, Language::English)
        .await;
    assert!(result.is_err());
    assert_eq!(stray_files(temp_dir.path()), 0);

    Ok(())
}

#[test]
fn extracted_buffer_exists_only_while_the_guard_lives() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let source = dir.path().join("track.wav");
    write_tone_wav(&source, 16000, 0.25)?;

    let temp_dir = TempDir::new()?;
    let extracted = extract_audio_track(&source, temp_dir.path())?;

    let buffer_path = extracted.path().to_path_buf();
    assert!(buffer_path.exists(), "buffer present during recognition");

    drop(extracted);
    assert!(!buffer_path.exists(), "buffer removed once the guard drops");

    Ok(())
}
