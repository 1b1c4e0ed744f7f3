use super::state::AppState;
use crate::language::Language;
use crate::session::{SessionConfig, SessionStats, TranscriptEntry};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartListeningRequest {
    /// Recognition locale (default: English)
    pub language: Option<Language>,

    /// Per-listen timeout override in seconds
    pub listen_timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartListeningResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopListeningResponse {
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Deserialize)]
pub struct RecognizeFileRequest {
    pub path: String,
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub struct RecognizeFileResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target: Language,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /listen/start
/// Start a new live capture session
pub async fn start_listening(
    State(state): State<AppState>,
    Json(req): Json<StartListeningRequest>,
) -> impl IntoResponse {
    let mut config = SessionConfig {
        language: req.language.unwrap_or_default(),
        listen_timeout: Duration::from_secs(state.capture.listen_timeout_secs),
        calibration_window: Duration::from_millis(state.capture.calibration_ms),
        ..SessionConfig::default()
    };
    if let Some(secs) = req.listen_timeout_secs {
        config.listen_timeout = Duration::from_secs(secs);
    }

    let session_id = config.session_id.clone();

    match state.controller.start(config).await {
        Ok(mut events) => {
            // Drain the live stream into the log; the accumulated transcript
            // serves GET /listen/transcript
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    debug!("Transcript event: {:?}", event);
                }
            });

            info!("Listening started (session: {})", session_id);

            (
                StatusCode::OK,
                Json(StartListeningResponse {
                    session_id: session_id.clone(),
                    status: "listening".to_string(),
                    message: format!("Capture session {} started", session_id),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start capture session: {}", e);
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Failed to start capture session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /listen/stop
/// Stop the active capture session
pub async fn stop_listening(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.stop().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(StopListeningResponse {
                status: "stopped".to_string(),
                stats,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop capture session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to stop capture session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /listen/status
/// Get status of the capture session
pub async fn listening_status(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.controller.stats().await;
    (StatusCode::OK, Json(stats)).into_response()
}

/// GET /listen/transcript
/// Get the accumulated transcript
pub async fn listening_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let transcript: Vec<TranscriptEntry> = state.controller.transcript().await;
    (StatusCode::OK, Json(transcript)).into_response()
}

/// POST /recognize/file
/// Recognize a complete pre-recorded audio file
pub async fn recognize_file(
    State(state): State<AppState>,
    Json(req): Json<RecognizeFileRequest>,
) -> impl IntoResponse {
    let path = PathBuf::from(&req.path);
    if !path.exists() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("File not found: {}", req.path),
            }),
        )
            .into_response();
    }

    let language = req.language.unwrap_or_default();

    match state.recognizer.recognize_audio_file(&path, language).await {
        Ok(text) => (StatusCode::OK, Json(RecognizeFileResponse { text })).into_response(),
        Err(e) => {
            error!("File recognition failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("File recognition failed: {:#}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /recognize/video
/// Extract the audio track from a video file and recognize it
pub async fn recognize_video(
    State(state): State<AppState>,
    Json(req): Json<RecognizeFileRequest>,
) -> impl IntoResponse {
    let path = PathBuf::from(&req.path);
    if !path.exists() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("File not found: {}", req.path),
            }),
        )
            .into_response();
    }

    let language = req.language.unwrap_or_default();

    match state.recognizer.recognize_video_file(&path, language).await {
        Ok(text) => (StatusCode::OK, Json(RecognizeFileResponse { text })).into_response(),
        Err(e) => {
            error!("Video recognition failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Video recognition failed: {:#}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /translate
/// Translate text into the target language
pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No text available for translation".to_string(),
            }),
        )
            .into_response();
    }

    match state.translator.translate(&req.text, req.target).await {
        Ok(text) => (StatusCode::OK, Json(TranslateResponse { text })).into_response(),
        Err(e) => {
            error!("Translation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Translation failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /synthesize
/// Convert text to speech, overwriting the shared output artifact
pub async fn synthesize(
    State(state): State<AppState>,
    Json(req): Json<SynthesizeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No text provided for conversion".to_string(),
            }),
        )
            .into_response();
    }

    let language = req.language.unwrap_or_default();

    let audio = match state.synthesizer.synthesize(&req.text, language).await {
        Ok(audio) => audio,
        Err(e) => {
            error!("Synthesis failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Synthesis failed: {}", e),
                }),
            )
                .into_response();
        }
    };

    if let Err(e) = state.output.write(&audio) {
        error!("Failed to write output artifact: {:#}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to write output artifact: {:#}", e),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(SynthesizeResponse {
            path: state.output.path().display().to_string(),
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
