//! Transcription boundary for Svar.
//!
//! The speech-to-text work itself is delegated to an external service; this
//! module defines the contract the pipeline depends on, plus the default
//! implementation backed by yt-dlp and the OpenAI Whisper API.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;

/// A transcribed video: an immutable transcript plus its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Video title.
    pub title: String,
    /// Full transcript text.
    pub text: String,
}

impl Transcript {
    /// Create a new transcript.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Download and transcribe the audio of a video.
    async fn transcribe(&self, video_url: &str) -> Result<Transcript>;
}
