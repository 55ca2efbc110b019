//! OpenAI Whisper transcription implementation.

use super::{Transcriber, Transcript};
use crate::audio::{download_audio, fetch_title, probe_duration};
use crate::error::{Result, SvarError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Whisper-based transcriber: downloads audio with yt-dlp, then sends it to
/// the OpenAI transcription API.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_duration_seconds: u32,
    temp_dir: PathBuf,
    video_id_regex: Regex,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber.
    pub fn new(
        model: &str,
        max_duration_seconds: u32,
        temp_dir: PathBuf,
        timeout: Duration,
    ) -> Self {
        // Matches common YouTube URL shapes; other URLs get a sanitized name.
        let video_id_regex = Regex::new(
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([a-zA-Z0-9_-]{11})",
        )
        .expect("static regex");

        Self {
            client: create_client_with_timeout(timeout),
            model: model.to_string(),
            max_duration_seconds,
            temp_dir,
            video_id_regex,
        }
    }

    /// Derive a filesystem-safe media ID from the video URL.
    fn media_id(&self, url: &str) -> String {
        if let Some(caps) = self.video_id_regex.captures(url) {
            return caps[1].to_string();
        }

        url.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(48)
            .collect()
    }

    /// Send an audio file to the transcription API and return plain text.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_audio(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| SvarError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(video_url = %video_url))]
    async fn transcribe(&self, video_url: &str) -> Result<Transcript> {
        url::Url::parse(video_url)
            .map_err(|_| SvarError::InvalidInput(format!("Not a valid URL: {}", video_url)))?;

        let media_id = self.media_id(video_url);

        info!("Fetching metadata for {}", media_id);
        let title = fetch_title(video_url).await?;

        let audio_path = download_audio(video_url, &media_id, &self.temp_dir).await?;

        let duration = probe_duration(&audio_path).await?;
        if duration > self.max_duration_seconds as f64 {
            let _ = std::fs::remove_file(&audio_path);
            return Err(SvarError::InvalidInput(format!(
                "Media duration ({:.0} seconds) exceeds maximum ({} seconds)",
                duration, self.max_duration_seconds
            )));
        }

        info!("Transcribing '{}' ({:.0}s of audio)", title, duration);
        let result = self.transcribe_audio(&audio_path).await;

        if let Err(e) = std::fs::remove_file(&audio_path) {
            warn!("Failed to cleanup audio file: {}", e);
        }

        let text = result?;
        if text.is_empty() {
            return Err(SvarError::Transcription(
                "Transcription produced no text".to_string(),
            ));
        }

        Ok(Transcript::new(title, text))
    }
}
