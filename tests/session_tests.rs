// Integration tests for the capture session controller
//
// These tests substitute scripted implementations at the AudioInput and
// SpeechToText seams, so ordering, cancellation, and failure semantics can
// be exercised without a physical microphone or a network service.

use async_trait::async_trait;
use parla::{
    AudioClip, AudioInput, AudioInputFactory, CaptureController, CaptureError, Language,
    ProviderError, SessionConfig, SpeechToText, TranscriptEvent,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

fn marked_clip(marker: i16) -> AudioClip {
    AudioClip {
        samples: vec![marker; 1600],
        sample_rate: 16000,
        channels: 1,
    }
}

fn test_config() -> SessionConfig {
    SessionConfig {
        listen_timeout: Duration::from_millis(200),
        calibration_window: Duration::from_millis(10),
        event_capacity: 1024,
        ..SessionConfig::default()
    }
}

async fn next_event(rx: &mut mpsc::Receiver<TranscriptEvent>) -> TranscriptEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for transcript event")
        .expect("event stream closed unexpectedly")
}

enum Step {
    Utterance(i16),
    Timeout,
    DeviceError(&'static str),
}

/// Replays a fixed sequence of listen outcomes, then times out forever.
struct ScriptedInput {
    steps: VecDeque<Step>,
}

#[async_trait]
impl AudioInput for ScriptedInput {
    async fn calibrate(&mut self, _window: Duration) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn next_utterance(&mut self, timeout: Duration) -> Result<AudioClip, CaptureError> {
        // Yield briefly so a stop request can interleave between listens
        tokio::time::sleep(Duration::from_millis(5)).await;

        match self.steps.pop_front() {
            Some(Step::Utterance(marker)) => Ok(marked_clip(marker)),
            Some(Step::Timeout) => Err(CaptureError::Timeout(timeout)),
            Some(Step::DeviceError(detail)) => Err(CaptureError::Device(detail.to_string())),
            None => {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(CaptureError::Timeout(timeout))
            }
        }
    }
}

/// Hands out one scripted input per open; opens fail once the scripts run
/// out, which doubles as a device-acquisition failure.
struct ScriptedFactory {
    scripts: Mutex<VecDeque<Vec<Step>>>,
}

impl ScriptedFactory {
    fn new(scripts: Vec<Vec<Step>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
        })
    }
}

impl AudioInputFactory for ScriptedFactory {
    fn open(&self) -> Result<Box<dyn AudioInput>, CaptureError> {
        let mut scripts = self.scripts.lock().expect("factory lock poisoned");
        match scripts.pop_front() {
            Some(steps) => Ok(Box::new(ScriptedInput {
                steps: steps.into(),
            })),
            None => Err(CaptureError::Device(
                "no input device available".to_string(),
            )),
        }
    }
}

/// Echoes each utterance's marker sample and records the locale tag used.
struct EchoSpeech {
    languages: Mutex<Vec<&'static str>>,
}

impl EchoSpeech {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            languages: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SpeechToText for EchoSpeech {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language: Language,
    ) -> Result<String, ProviderError> {
        self.languages
            .lock()
            .expect("language lock poisoned")
            .push(language.tag());
        Ok(format!("utterance-{}", audio.samples[0]))
    }
}

/// Replays a fixed sequence of provider outcomes.
struct ScriptedSpeech {
    outcomes: Mutex<VecDeque<Result<String, ProviderError>>>,
}

impl ScriptedSpeech {
    fn new(outcomes: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        })
    }
}

#[async_trait]
impl SpeechToText for ScriptedSpeech {
    async fn transcribe(
        &self,
        _audio: &AudioClip,
        _language: Language,
    ) -> Result<String, ProviderError> {
        self.outcomes
            .lock()
            .expect("outcome lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok("unscripted".to_string()))
    }
}

#[tokio::test]
async fn events_arrive_in_capture_order() {
    let factory = ScriptedFactory::new(vec![vec![
        Step::Utterance(1),
        Step::Utterance(2),
        Step::Utterance(3),
    ]]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let mut events = controller.start(test_config()).await.expect("start failed");

    for expected in ["utterance-1", "utterance-2", "utterance-3"] {
        match next_event(&mut events).await {
            TranscriptEvent::Recognized { text } => assert_eq!(text, expected),
            other => panic!("expected recognized text, got {:?}", other),
        }
    }

    controller.stop().await.expect("stop failed");
}

#[tokio::test]
async fn classified_notices_do_not_end_the_session() {
    let factory = ScriptedFactory::new(vec![vec![
        Step::Utterance(1),
        Step::Timeout,
        Step::Utterance(2),
        Step::Utterance(3),
    ]]);
    let speech = ScriptedSpeech::new(vec![
        Ok("first".to_string()),
        Err(ProviderError::NotUnderstood),
        Err(ProviderError::Service("connection reset".to_string())),
    ]);
    let controller = CaptureController::new(factory, speech);

    let mut events = controller.start(test_config()).await.expect("start failed");

    assert_eq!(
        next_event(&mut events).await,
        TranscriptEvent::Recognized {
            text: "first".to_string()
        }
    );
    assert_eq!(next_event(&mut events).await, TranscriptEvent::ListenTimeout);
    assert_eq!(next_event(&mut events).await, TranscriptEvent::NotUnderstood);
    assert_eq!(
        next_event(&mut events).await,
        TranscriptEvent::ServiceError {
            detail: "connection reset".to_string()
        }
    );

    // Four reported failures later the session is still listening
    let stats = controller.stats().await;
    assert!(stats.listening);

    controller.stop().await.expect("stop failed");
}

#[tokio::test]
async fn stop_quiesces_the_event_stream() {
    let steps: Vec<Step> = (0..500i16).map(Step::Utterance).collect();
    let factory = ScriptedFactory::new(vec![steps]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let mut events = controller.start(test_config()).await.expect("start failed");

    let mut received = 0usize;
    for _ in 0..3 {
        next_event(&mut events).await;
        received += 1;
    }

    let stats = controller.stop().await.expect("stop failed");
    assert!(!stats.listening);

    // Drain whatever was emitted before the loop observed the stop; the
    // channel must then close with nothing further behind it.
    while let Some(_event) = events.recv().await {
        received += 1;
    }

    let transcript = controller.transcript().await;
    assert_eq!(
        transcript.len(),
        received,
        "every emitted event is observed exactly once"
    );
    assert_eq!(stats.events, received);
}

#[tokio::test]
async fn start_while_active_is_rejected() {
    let steps: Vec<Step> = (0..500i16).map(Step::Utterance).collect();
    let factory = ScriptedFactory::new(vec![steps]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let mut events = controller.start(test_config()).await.expect("start failed");
    next_event(&mut events).await;

    let second = controller.start(test_config()).await;
    let err = second.expect_err("second start must be rejected while active");
    assert!(err.to_string().contains("already active"));

    controller.stop().await.expect("stop failed");
}

#[tokio::test]
async fn device_acquisition_failure_is_terminal_and_reported_once() {
    // No scripts: every open fails
    let factory = ScriptedFactory::new(vec![]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let mut events = controller.start(test_config()).await.expect("start failed");

    match next_event(&mut events).await {
        TranscriptEvent::DeviceError { detail } => {
            assert!(detail.contains("no input device"));
        }
        other => panic!("expected device error, got {:?}", other),
    }

    // Exactly one notice, then the stream closes
    assert_eq!(events.recv().await, None);
    assert_eq!(controller.transcript().await.len(), 1);

    // The controller accepts a new start once the failed session is reaped
    let mut restarted = Err(anyhow::anyhow!("not attempted"));
    for _ in 0..50 {
        restarted = controller.start(test_config()).await;
        if restarted.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    restarted.expect("controller must be ready for a new start");
}

#[tokio::test]
async fn mid_session_device_loss_emits_one_final_notice() {
    let factory = ScriptedFactory::new(vec![vec![
        Step::Utterance(9),
        Step::DeviceError("stream died"),
    ]]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let mut events = controller.start(test_config()).await.expect("start failed");

    assert_eq!(
        next_event(&mut events).await,
        TranscriptEvent::Recognized {
            text: "utterance-9".to_string()
        }
    );
    assert_eq!(
        next_event(&mut events).await,
        TranscriptEvent::DeviceError {
            detail: "stream died".to_string()
        }
    );
    assert_eq!(events.recv().await, None);
    assert_eq!(controller.transcript().await.len(), 2);
}

#[tokio::test]
async fn session_language_is_fixed_at_start() {
    let factory = ScriptedFactory::new(vec![vec![Step::Utterance(1), Step::Utterance(2)]]);
    let speech = EchoSpeech::new();
    let controller = CaptureController::new(factory, Arc::clone(&speech) as Arc<dyn SpeechToText>);

    let config = SessionConfig {
        language: Language::Italian,
        ..test_config()
    };

    let mut events = controller.start(config).await.expect("start failed");
    next_event(&mut events).await;
    next_event(&mut events).await;
    controller.stop().await.expect("stop failed");

    let languages = speech.languages.lock().expect("language lock poisoned");
    assert_eq!(&*languages, &["it", "it"]);
}

#[tokio::test]
async fn stop_without_start_is_a_no_op() {
    let factory = ScriptedFactory::new(vec![]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let stats = controller.stop().await.expect("stop failed");
    assert!(!stats.listening);
    assert_eq!(stats.events, 0);
    assert_eq!(stats.session_id, None);
}

#[tokio::test]
async fn restart_after_stop_begins_a_fresh_transcript() {
    let factory = ScriptedFactory::new(vec![vec![Step::Utterance(1)], vec![Step::Utterance(7)]]);
    let controller = CaptureController::new(factory, EchoSpeech::new());

    let mut events = controller.start(test_config()).await.expect("start failed");
    next_event(&mut events).await;
    controller.stop().await.expect("stop failed");

    let mut events = controller.start(test_config()).await.expect("restart failed");
    assert_eq!(
        next_event(&mut events).await,
        TranscriptEvent::Recognized {
            text: "utterance-7".to_string()
        }
    );
    controller.stop().await.expect("stop failed");

    // The first session's entries were cleared by the new start
    let transcript = controller.transcript().await;
    assert!(matches!(
        &transcript[0].event,
        TranscriptEvent::Recognized { text } if text == "utterance-7"
    ));
}
