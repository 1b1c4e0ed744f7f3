//! Capture session management
//!
//! This module provides the `CaptureController` abstraction that manages:
//! - The continuous listen-recognize-report loop on its own task
//! - Ambient-noise calibration before the first listen
//! - Ordered transcript event emission and accumulation
//! - Cooperative stop with full quiescence
//! - Session statistics and state management

mod config;
mod controller;
mod events;
mod stats;

pub use config::SessionConfig;
pub use controller::CaptureController;
pub use events::{TranscriptEntry, TranscriptEvent};
pub use stats::SessionStats;
