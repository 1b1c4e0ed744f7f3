use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ordered unit of output from a capture session: recognized text or a
/// classified notice. Everything except `DeviceError` is non-fatal and the
/// session keeps listening after emitting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEvent {
    /// Speech was recognized successfully
    Recognized { text: String },

    /// No phrase began within the listen window
    ListenTimeout,

    /// The recognizer received the audio but found no intelligible speech
    NotUnderstood,

    /// The provider call failed in transit
    ServiceError { detail: String },

    /// The input device failed; this is the session's final event
    DeviceError { detail: String },
}

impl TranscriptEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TranscriptEvent::DeviceError { .. })
    }
}

/// A transcript event plus when it was produced, as accumulated for later
/// retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub event: TranscriptEvent,
    pub timestamp: DateTime<Utc>,
}
