// Microphone input backed by cpal
//
// The cpal stream is not Send, so it lives on a dedicated capture thread
// that forwards fixed-size frames over a channel. The async side does
// calibration and energy-gated utterance segmentation on those frames.

use super::clip::AudioClip;
use super::input::{AudioInput, AudioInputFactory, CaptureError, InputConfig};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Threshold used before calibration has run (quiet-room default).
const DEFAULT_ENERGY_THRESHOLD: f64 = 300.0;

/// Calibrated threshold sits this far above the measured ambient energy.
const ENERGY_MULTIPLIER: f64 = 1.5;

/// How long the capture thread may take to open the device before the
/// session gives up on it.
const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Grace period for the next frame once a phrase has started; a stalled
/// stream ends the phrase rather than hanging the listen loop.
const FRAME_STALL_TIMEOUT: Duration = Duration::from_secs(1);

enum MicFrame {
    Audio(AudioClip),
    Failed(String),
}

/// Opens a `MicrophoneInput` per session.
pub struct MicrophoneFactory {
    config: InputConfig,
}

impl MicrophoneFactory {
    pub fn new(config: InputConfig) -> Self {
        Self { config }
    }
}

impl AudioInputFactory for MicrophoneFactory {
    fn open(&self) -> Result<Box<dyn AudioInput>, CaptureError> {
        Ok(Box::new(MicrophoneInput::open(self.config.clone())?))
    }
}

/// Exclusive handle on the platform microphone for one capture session.
pub struct MicrophoneInput {
    config: InputConfig,
    frames: mpsc::Receiver<MicFrame>,
    energy_threshold: f64,
    shutdown: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneInput {
    pub fn open(config: InputConfig) -> Result<Self, CaptureError> {
        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel(1);
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_shutdown = Arc::clone(&shutdown);
        let frame_ms = config.frame_duration_ms;
        let thread = std::thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || run_stream(frame_tx, ready_tx, thread_shutdown, frame_ms))
            .map_err(|e| CaptureError::Device(format!("failed to spawn capture thread: {}", e)))?;

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(())) => {}
            Ok(Err(detail)) => {
                let _ = thread.join();
                return Err(CaptureError::Device(detail));
            }
            Err(_) => {
                shutdown.store(true, Ordering::SeqCst);
                return Err(CaptureError::Device(
                    "timed out waiting for the input device to open".to_string(),
                ));
            }
        }

        info!("Microphone opened ({}ms frames)", frame_ms);

        Ok(Self {
            config,
            frames: frame_rx,
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            shutdown,
            thread: Some(thread),
        })
    }

    async fn recv_frame(&mut self, wait: Duration) -> Result<Option<AudioClip>, CaptureError> {
        match tokio::time::timeout(wait, self.frames.recv()).await {
            Err(_) => Ok(None),
            Ok(None) => Err(CaptureError::Device("input stream closed".to_string())),
            Ok(Some(MicFrame::Failed(detail))) => Err(CaptureError::Device(detail)),
            Ok(Some(MicFrame::Audio(frame))) => Ok(Some(frame)),
        }
    }
}

#[async_trait::async_trait]
impl AudioInput for MicrophoneInput {
    async fn calibrate(&mut self, window: Duration) -> Result<(), CaptureError> {
        let started = tokio::time::Instant::now();
        let mut energies = Vec::new();

        while let Some(remaining) = window.checked_sub(started.elapsed()) {
            if remaining.is_zero() {
                break;
            }
            match self.recv_frame(remaining).await? {
                Some(frame) => energies.push(frame.rms()),
                None => break,
            }
        }

        if energies.is_empty() {
            warn!(
                "No ambient frames arrived within {:?}; keeping default threshold {}",
                window, self.energy_threshold
            );
            return Ok(());
        }

        let ambient = energies.iter().sum::<f64>() / energies.len() as f64;
        self.energy_threshold = (ambient * ENERGY_MULTIPLIER).max(self.config.energy_floor);
        info!(
            "Ambient noise calibrated: {:.0} rms over {} frames, threshold {:.0}",
            ambient,
            energies.len(),
            self.energy_threshold
        );

        Ok(())
    }

    async fn next_utterance(&mut self, timeout: Duration) -> Result<AudioClip, CaptureError> {
        let started = tokio::time::Instant::now();

        // Phase 1: wait for a frame loud enough to start a phrase. The
        // timeout bounds this wait, so a stop request is observed within
        // one listen attempt. The last quiet frame is kept as lead-in so
        // the phrase onset is not clipped.
        let mut lead_in: Option<AudioClip> = None;
        let first = loop {
            let remaining = timeout
                .checked_sub(started.elapsed())
                .filter(|r| !r.is_zero())
                .ok_or(CaptureError::Timeout(timeout))?;

            match self.recv_frame(remaining).await? {
                None => return Err(CaptureError::Timeout(timeout)),
                Some(frame) if frame.rms() >= self.energy_threshold => break frame,
                Some(frame) => lead_in = Some(frame),
            }
        };

        // Phase 2: collect until trailing silence or the phrase cap.
        let sample_rate = first.sample_rate;
        let channels = first.channels;
        let mut samples = Vec::new();
        if let Some(lead) = lead_in.take() {
            samples.extend(lead.samples);
        }
        samples.extend(first.samples);

        let frame_ms = self.config.frame_duration_ms;
        let mut silent_ms = 0u64;
        let mut phrase_ms = frame_ms;

        while silent_ms < self.config.phrase_silence_ms && phrase_ms < self.config.max_phrase_ms {
            match self.recv_frame(FRAME_STALL_TIMEOUT).await? {
                None => {
                    warn!("Input stream stalled mid-phrase; ending utterance early");
                    break;
                }
                Some(frame) => {
                    silent_ms = if frame.rms() < self.energy_threshold {
                        silent_ms + frame_ms
                    } else {
                        0
                    };
                    phrase_ms += frame_ms;
                    samples.extend(frame.samples);
                }
            }
        }

        let mut clip = AudioClip {
            samples,
            sample_rate,
            channels,
        };
        if clip.channels != self.config.target_channels && self.config.target_channels == 1 {
            clip = clip.mixed_to_mono();
        }
        let clip = clip.decimated_to(self.config.target_sample_rate);

        debug!("Captured utterance: {:.1}s", clip.duration_seconds());

        Ok(clip)
    }
}

impl Drop for MicrophoneInput {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Capture thread body: owns the cpal stream for the input's lifetime and
/// forwards fixed-size frames. Reports open success or failure exactly once
/// on `ready`.
fn run_stream(
    frames: mpsc::Sender<MicFrame>,
    ready: SyncSender<Result<(), String>>,
    shutdown: Arc<AtomicBool>,
    frame_ms: u64,
) {
    let host = cpal::default_host();

    let Some(device) = host.default_input_device() else {
        let _ = ready.send(Err("no input device available".to_string()));
        return;
    };

    let supported = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => {
            let _ = ready.send(Err(format!("input device rejected configuration: {}", e)));
            return;
        }
    };

    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;
    let samples_per_frame = (sample_rate as u64 * frame_ms / 1000) as usize * channels as usize;

    let error_frames = frames.clone();
    let error_callback = move |e: cpal::StreamError| {
        let _ = error_frames.try_send(MicFrame::Failed(format!("input stream error: {}", e)));
    };

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            frame_callback(frames, samples_per_frame, sample_rate, channels, |s: f32| {
                (s.clamp(-1.0, 1.0) * 32767.0) as i16
            }),
            error_callback,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            frame_callback(frames, samples_per_frame, sample_rate, channels, |s: i16| s),
            error_callback,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            frame_callback(frames, samples_per_frame, sample_rate, channels, |s: u16| {
                (s as i32 - 32768) as i16
            }),
            error_callback,
            None,
        ),
        other => {
            let _ = ready.send(Err(format!("unsupported input sample format: {:?}", other)));
            return;
        }
    };

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(format!("failed to open input stream: {}", e)));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(format!("failed to start input stream: {}", e)));
        return;
    }

    let _ = ready.send(Ok(()));

    while !shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
}

/// Accumulates device buffers into fixed-duration frames and forwards them.
/// A lagging consumer drops frames rather than backing up the device.
fn frame_callback<T, F>(
    frames: mpsc::Sender<MicFrame>,
    samples_per_frame: usize,
    sample_rate: u32,
    channels: u16,
    convert: F,
) -> impl FnMut(&[T], &cpal::InputCallbackInfo) + Send + 'static
where
    T: Copy + Send + 'static,
    F: Fn(T) -> i16 + Send + 'static,
{
    let mut pending: Vec<i16> = Vec::with_capacity(samples_per_frame);

    move |data: &[T], _info: &cpal::InputCallbackInfo| {
        for &sample in data {
            pending.push(convert(sample));
        }

        while pending.len() >= samples_per_frame {
            let rest = pending.split_off(samples_per_frame);
            let chunk = std::mem::replace(&mut pending, rest);
            let clip = AudioClip {
                samples: chunk,
                sample_rate,
                channels,
            };
            let _ = frames.try_send(MicFrame::Audio(clip));
        }
    }
}
