use super::config::SessionConfig;
use super::events::{TranscriptEntry, TranscriptEvent};
use super::stats::SessionStats;
use crate::audio::{AudioInputFactory, CaptureError};
use crate::language::Language;
use crate::providers::{ProviderError, SpeechToText};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct ActiveSession {
    id: String,
    language: Language,
    started_at: DateTime<Utc>,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Drives a continuous listen-recognize-report cycle against a live input
/// device without blocking its caller.
///
/// At most one session is active per controller. `start` spawns the capture
/// loop on its own task and returns an ordered event stream; `stop` flips
/// the session's running flag and joins the task, so once it returns the
/// session has fully quiesced and no further event can be observed. Every
/// event is also appended to an accumulated transcript, so a consumer that
/// drops the stream early loses nothing.
pub struct CaptureController {
    input_factory: Arc<dyn AudioInputFactory>,
    speech: Arc<dyn SpeechToText>,
    active: Mutex<Option<ActiveSession>>,
    entries: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl CaptureController {
    pub fn new(input_factory: Arc<dyn AudioInputFactory>, speech: Arc<dyn SpeechToText>) -> Self {
        Self {
            input_factory,
            speech,
            active: Mutex::new(None),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start a new capture session.
    ///
    /// Fails with a busy error while another session is active. A session
    /// that already exited on its own (device failure) is reaped here, so
    /// the controller is always ready for a new start once the previous
    /// session's event stream has closed.
    pub async fn start(&self, config: SessionConfig) -> Result<mpsc::Receiver<TranscriptEvent>> {
        let mut active = self.active.lock().await;

        if let Some(session) = active.as_ref() {
            if !session.handle.is_finished() {
                bail!("a capture session is already active (id: {})", session.id);
            }
        }
        if let Some(finished) = active.take() {
            if let Err(e) = finished.handle.await {
                error!("Previous capture task panicked: {}", e);
            }
        }

        info!(
            "Starting capture session {} (language: {})",
            config.session_id, config.language
        );

        {
            self.entries.lock().await.clear();
        }

        let running = Arc::new(AtomicBool::new(true));
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity);

        let handle = tokio::spawn(Self::run_loop(
            Arc::clone(&self.input_factory),
            Arc::clone(&self.speech),
            config.clone(),
            Arc::clone(&running),
            event_tx,
            Arc::clone(&self.entries),
        ));

        *active = Some(ActiveSession {
            id: config.session_id,
            language: config.language,
            started_at: Utc::now(),
            running,
            handle,
        });

        Ok(event_rx)
    }

    /// Stop the active session and wait for it to fully quiesce.
    pub async fn stop(&self) -> Result<SessionStats> {
        let mut active = self.active.lock().await;

        let Some(session) = active.take() else {
            warn!("Stop requested with no active capture session");
            drop(active);
            return Ok(self.stats().await);
        };

        info!("Stopping capture session {}", session.id);

        session.running.store(false, Ordering::SeqCst);
        if let Err(e) = session.handle.await {
            error!("Capture task panicked: {}", e);
        }

        let (events, recognized) = self.counts().await;
        let stats = SessionStats {
            listening: false,
            session_id: Some(session.id.clone()),
            language: Some(session.language),
            started_at: Some(session.started_at),
            duration_secs: (Utc::now() - session.started_at).num_milliseconds() as f64 / 1000.0,
            events,
            recognized,
        };

        info!("Capture session {} stopped", session.id);

        Ok(stats)
    }

    /// Current session statistics.
    pub async fn stats(&self) -> SessionStats {
        let active = self.active.lock().await;
        let (events, recognized) = self.counts().await;

        let meta = active.as_ref();
        let listening = meta.map(|s| !s.handle.is_finished()).unwrap_or(false);

        SessionStats {
            listening,
            session_id: meta.map(|s| s.id.clone()),
            language: meta.map(|s| s.language),
            started_at: meta.map(|s| s.started_at),
            duration_secs: meta
                .map(|s| (Utc::now() - s.started_at).num_milliseconds() as f64 / 1000.0)
                .unwrap_or(0.0),
            events,
            recognized,
        }
    }

    /// Accumulated transcript of the current (or most recent) session.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        let entries = self.entries.lock().await;
        entries.clone()
    }

    async fn counts(&self) -> (usize, usize) {
        let entries = self.entries.lock().await;
        let recognized = entries
            .iter()
            .filter(|e| matches!(e.event, TranscriptEvent::Recognized { .. }))
            .count();
        (entries.len(), recognized)
    }

    /// The session body: open the device, calibrate once, then
    /// listen-recognize-emit until `running` is cleared.
    ///
    /// Per-utterance failures (timeout, not understood, provider error) are
    /// reported and tolerated. Losing the device itself is terminal: one
    /// final notice and the loop exits. The flag is re-checked after every
    /// bounded blocking call; nothing is emitted once the loop has observed
    /// it cleared.
    async fn run_loop(
        input_factory: Arc<dyn AudioInputFactory>,
        speech: Arc<dyn SpeechToText>,
        config: SessionConfig,
        running: Arc<AtomicBool>,
        events: mpsc::Sender<TranscriptEvent>,
        entries: Arc<Mutex<Vec<TranscriptEntry>>>,
    ) {
        let opened =
            tokio::task::spawn_blocking(move || input_factory.open()).await;

        let mut input = match opened {
            Ok(Ok(input)) => input,
            Ok(Err(e)) => {
                Self::fail_session(&running, &events, &entries, e.to_string()).await;
                return;
            }
            Err(e) => {
                Self::fail_session(&running, &events, &entries, format!("open task failed: {}", e))
                    .await;
                return;
            }
        };

        if let Err(e) = input.calibrate(config.calibration_window).await {
            Self::fail_session(&running, &events, &entries, e.to_string()).await;
            return;
        }

        info!("Capture session {} listening", config.session_id);

        while running.load(Ordering::SeqCst) {
            let outcome = input.next_utterance(config.listen_timeout).await;

            // A stop observed here means the listen was the last one; the
            // outcome is discarded rather than emitted past the stop point.
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let event = match outcome {
                Ok(clip) => {
                    debug!(
                        "Recognizing {:.1}s utterance for session {}",
                        clip.duration_seconds(),
                        config.session_id
                    );
                    match speech.transcribe(&clip, config.language).await {
                        Ok(text) => TranscriptEvent::Recognized { text },
                        Err(ProviderError::NotUnderstood) => TranscriptEvent::NotUnderstood,
                        Err(ProviderError::Service(detail)) => {
                            warn!("Speech provider error: {}", detail);
                            TranscriptEvent::ServiceError { detail }
                        }
                    }
                }
                Err(CaptureError::Timeout(_)) => TranscriptEvent::ListenTimeout,
                Err(CaptureError::Device(detail)) => {
                    error!(
                        "Capture session {} lost the input device: {}",
                        config.session_id, detail
                    );
                    if running.swap(false, Ordering::SeqCst) {
                        Self::emit(
                            &running,
                            &events,
                            &entries,
                            TranscriptEvent::DeviceError { detail },
                        )
                        .await;
                    }
                    break;
                }
            };

            if !running.load(Ordering::SeqCst) {
                break;
            }

            Self::emit(&running, &events, &entries, event).await;
        }

        info!("Capture session {} exited", config.session_id);
    }

    /// Terminal path for device-acquisition failures: exactly one notice,
    /// then the session is over and the controller accepts a new start.
    async fn fail_session(
        running: &AtomicBool,
        events: &mpsc::Sender<TranscriptEvent>,
        entries: &Mutex<Vec<TranscriptEntry>>,
        detail: String,
    ) {
        error!("Capture session could not use the input device: {}", detail);
        if running.swap(false, Ordering::SeqCst) {
            Self::emit(running, events, entries, TranscriptEvent::DeviceError { detail }).await;
        }
    }

    /// Record the event, then offer it to the live stream without ever
    /// wedging the session: a full channel is retried until the consumer
    /// catches up or the session is stopped. The accumulated transcript
    /// always has the event, so nothing is silently lost.
    async fn emit(
        running: &AtomicBool,
        events: &mpsc::Sender<TranscriptEvent>,
        entries: &Mutex<Vec<TranscriptEntry>>,
        mut event: TranscriptEvent,
    ) {
        {
            entries.lock().await.push(TranscriptEntry {
                event: event.clone(),
                timestamp: Utc::now(),
            });
        }

        loop {
            match events.try_send(event) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Consumer went away; the accumulated transcript still has it
                    debug!("Transcript event consumer dropped");
                    return;
                }
                Err(mpsc::error::TrySendError::Full(returned)) => {
                    if !running.load(Ordering::SeqCst) {
                        debug!("Stop requested with a full event channel");
                        return;
                    }
                    event = returned;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}
