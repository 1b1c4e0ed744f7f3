pub mod clip;
pub mod extract;
pub mod file;
pub mod input;
pub mod mic;

pub use clip::AudioClip;
pub use extract::extract_audio_track;
pub use file::AudioFile;
pub use input::{AudioInput, AudioInputFactory, CaptureError, InputConfig};
pub use mic::{MicrophoneFactory, MicrophoneInput};
