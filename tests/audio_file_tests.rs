// Integration tests for audio file decoding
//
// Fixtures are generated on the fly with hound and decoded back through the
// symphonia path used for user-supplied files.

use anyhow::Result;
use parla::AudioFile;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_tone_wav(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    seconds: f64,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let frames = (sample_rate as f64 * seconds) as usize;
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = (8000.0 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()?;

    Ok(())
}

#[test]
fn audio_file_open_reads_wav_metadata() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("tone.wav");
    write_tone_wav(&path, 16000, 1, 1.0)?;

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 16000);
    assert!((audio.duration_seconds - 1.0).abs() < 0.01);
    assert!(audio.path.contains("tone.wav"));

    Ok(())
}

#[test]
fn audio_file_open_handles_stereo() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("stereo.wav");
    write_tone_wav(&path, 32000, 2, 0.5)?;

    let audio = AudioFile::open(&path)?;

    assert_eq!(audio.channels, 2);
    assert_eq!(audio.sample_rate, 32000);
    // Interleaved: total samples = frames * channels
    assert_eq!(audio.samples.len(), 32000);
    assert_eq!(audio.samples.len() % audio.channels as usize, 0);

    Ok(())
}

#[test]
fn audio_file_open_rejects_missing_file() {
    let result = AudioFile::open(PathBuf::from("/nonexistent/path/to/audio.wav"));
    assert!(result.is_err(), "opening nonexistent file should fail");
}

#[test]
fn audio_file_open_rejects_corrupt_data() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("garbage.wav");
    std::fs::write(&path, b"this is not audio data at all")?;

    let result = AudioFile::open(&path);
    assert!(result.is_err(), "corrupt data should fail to decode");

    Ok(())
}

#[test]
fn to_mono_16khz_folds_and_decimates() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("hifi.wav");
    write_tone_wav(&path, 32000, 2, 1.0)?;

    let audio = AudioFile::open(&path)?;
    let clip = audio.to_mono_16khz();

    assert_eq!(clip.channels, 1);
    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.samples.len(), 16000);

    Ok(())
}

#[test]
fn into_clip_preserves_format() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("clip.wav");
    write_tone_wav(&path, 16000, 1, 0.25)?;

    let audio = AudioFile::open(&path)?;
    let expected_samples = audio.samples.len();
    let clip = audio.into_clip();

    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.channels, 1);
    assert_eq!(clip.samples.len(), expected_samples);
    assert!((clip.duration_seconds() - 0.25).abs() < 0.01);

    Ok(())
}
