//! Speech-to-text backends.

pub mod mock;
pub mod traits;
pub mod whisper;

pub use mock::MockTranscriber;
pub use traits::{SpeechToText, Transcript, TranscriptSegment, TranscriptWord, TranscriptionError};
pub use whisper::WhisperBackend;
