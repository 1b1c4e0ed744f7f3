use super::file::decode_samples;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Extract the audio track of a video container into a temporary WAV file.
///
/// The returned guard owns the buffer: it is removed from disk when the
/// guard drops, whether or not the recognition that follows succeeds. This
/// is the ephemeral intermediate of video recognition, never retained state.
pub fn extract_audio_track(video: &Path, temp_dir: &Path) -> Result<NamedTempFile> {
    info!("Extracting audio track from {}", video.display());

    let (samples, sample_rate, channels) = decode_samples(video)
        .with_context(|| format!("Failed to extract audio from {}", video.display()))?;

    fs::create_dir_all(temp_dir)
        .with_context(|| format!("Failed to create temp directory {}", temp_dir.display()))?;

    let file = tempfile::Builder::new()
        .prefix("extracted-audio-")
        .suffix(".wav")
        .tempfile_in(temp_dir)
        .context("Failed to create temporary audio buffer")?;

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(file.path(), spec)
        .context("Failed to create extracted WAV file")?;
    for &sample in &samples {
        writer
            .write_sample(sample)
            .context("Failed to write extracted sample")?;
    }
    writer
        .finalize()
        .context("Failed to finalize extracted WAV file")?;

    info!(
        "Extracted audio: {:.1}s at {}Hz to {}",
        samples.len() as f64 / (sample_rate as f64 * channels as f64),
        sample_rate,
        file.path().display()
    );

    Ok(file)
}
