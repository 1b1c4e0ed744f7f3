use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether a session is currently listening
    pub listening: bool,

    /// Identifier of the current (or most recent) session
    pub session_id: Option<String>,

    /// The session's recognition locale
    pub language: Option<Language>,

    /// When the session started
    pub started_at: Option<DateTime<Utc>>,

    /// Session duration in seconds
    pub duration_secs: f64,

    /// Total transcript events emitted so far
    pub events: usize,

    /// Events that carried recognized text
    pub recognized: usize,
}
