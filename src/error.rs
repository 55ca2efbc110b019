//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("No video has been processed yet")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SvarError {
    /// Whether this error is the caller's fault (bad input or calling
    /// before a video was processed) rather than a system fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, SvarError::NotReady | SvarError::InvalidInput(_))
    }

    /// Whether this error came from an upstream dependency (transcription,
    /// embedding, or completion service).
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            SvarError::Transcription(_)
                | SvarError::Embedding(_)
                | SvarError::Generation(_)
                | SvarError::OpenAI(_)
                | SvarError::Http(_)
        )
    }
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;
