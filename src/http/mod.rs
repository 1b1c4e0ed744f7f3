//! HTTP API for external control (the application shell)
//!
//! This module provides a REST API that a UI shell drives:
//! - POST /listen/start - Start a live capture session
//! - POST /listen/stop - Stop the active session
//! - GET /listen/status - Query session status
//! - GET /listen/transcript - Get the accumulated transcript
//! - POST /recognize/file - Recognize a pre-recorded audio file
//! - POST /recognize/video - Recognize the audio track of a video file
//! - POST /translate - Translate text
//! - POST /synthesize - Convert text to speech
//! - GET /health - Health check
//!
//! One-shot handlers run their provider call within the request; the live
//! session never does.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
