use super::clip::AudioClip;
use std::time::Duration;
use thiserror::Error;

/// Failure modes of a live audio input.
///
/// A `Timeout` is a per-listen notice the session tolerates; a `Device`
/// error means the input itself is gone and the session must end.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no utterance detected within {0:?}")]
    Timeout(Duration),
    #[error("audio input device error: {0}")]
    Device(String),
}

/// Configuration for a live audio input.
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Target sample rate for delivered utterances (will decimate if needed)
    pub target_sample_rate: u32,
    /// Target channel count for delivered utterances (1 = mono)
    pub target_channels: u16,
    /// Size of the internal capture frames in milliseconds
    pub frame_duration_ms: u64,
    /// Trailing silence that ends an utterance
    pub phrase_silence_ms: u64,
    /// Hard cap on utterance length
    pub max_phrase_ms: u64,
    /// Lower bound for the calibrated energy threshold
    pub energy_floor: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // what cloud recognizers expect
            target_channels: 1,        // Mono
            frame_duration_ms: 100,    // 100ms frames
            phrase_silence_ms: 800,
            max_phrase_ms: 15_000,
            energy_floor: 300.0,
        }
    }
}

/// Live audio input device
///
/// One input is opened per capture session and is exclusive to it. The
/// microphone implementation runs the platform stream on a dedicated thread;
/// tests substitute scripted implementations at this seam.
#[async_trait::async_trait]
pub trait AudioInput: Send {
    /// Sample ambient noise to set the energy threshold for utterance
    /// detection. Called exactly once, after open and before the first
    /// listen.
    async fn calibrate(&mut self, window: Duration) -> Result<(), CaptureError>;

    /// Wait at most `timeout` for a phrase to begin, then collect it until
    /// trailing silence or the phrase-length cap.
    async fn next_utterance(&mut self, timeout: Duration) -> Result<AudioClip, CaptureError>;
}

/// Opens a fresh input device for each capture session.
pub trait AudioInputFactory: Send + Sync {
    fn open(&self) -> Result<Box<dyn AudioInput>, CaptureError>;
}
