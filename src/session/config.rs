use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Recognition locale, fixed for the session's lifetime
    pub language: Language,

    /// Upper bound on each wait for a phrase to begin. This also bounds how
    /// long a stop request can go unobserved.
    pub listen_timeout: Duration,

    /// Ambient-noise sampling window, run once before the first listen
    pub calibration_window: Duration,

    /// Capacity of the transcript event channel
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            language: Language::default(),
            listen_timeout: Duration::from_secs(10),
            calibration_window: Duration::from_secs(1),
            event_capacity: 64,
        }
    }
}
