use anyhow::{Context, Result};
use std::io::Cursor;

/// One contiguous span of audio (i16 PCM, interleaved).
///
/// A clip is either a single captured utterance or the full contents of a
/// pre-recorded file, and is the unit submitted to speech recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

impl AudioClip {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Root-mean-square energy across all samples. Used for ambient-noise
    /// calibration and utterance detection.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self
            .samples
            .iter()
            .map(|&s| {
                let s = s as f64;
                s * s
            })
            .sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    /// Fold all channels into one by summing, clamped to the i16 range.
    pub fn mixed_to_mono(self) -> AudioClip {
        if self.channels <= 1 {
            return self;
        }

        let channels = self.channels as usize;
        let mut mono_samples = Vec::with_capacity(self.samples.len() / channels);

        for frame in self.samples.chunks_exact(channels) {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            mono_samples.push(sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
        }

        AudioClip {
            samples: mono_samples,
            sample_rate: self.sample_rate,
            channels: 1,
        }
    }

    /// Downsample by frame-wise decimation: every Nth sample frame is kept,
    /// where N is the integer ratio of the current rate to `target_rate`.
    /// Upsampling is not supported; the clip is returned unchanged.
    pub fn decimated_to(self, target_rate: u32) -> AudioClip {
        if target_rate == 0 || self.sample_rate <= target_rate {
            return self;
        }

        let ratio = (self.sample_rate / target_rate) as usize;
        if ratio <= 1 {
            return self;
        }

        let channels = self.channels as usize;
        let mut decimated = Vec::with_capacity(self.samples.len() / ratio);
        for frame in self.samples.chunks_exact(channels).step_by(ratio) {
            decimated.extend_from_slice(frame);
        }

        AudioClip {
            samples: decimated,
            // Integer decimation may land short of the target (e.g. 44.1kHz -> 22.05kHz)
            sample_rate: self.sample_rate / ratio as u32,
            channels: self.channels,
        }
    }

    /// Encode the clip as an in-memory WAV file for provider upload.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut buffer, spec)
                .context("Failed to create WAV writer")?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV buffer")?;
            }

            writer.finalize().context("Failed to finalize WAV buffer")?;
        }

        Ok(buffer.into_inner())
    }
}
