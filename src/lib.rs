//! Svar - Video RAG Chat
//!
//! Submit a video link, get a transcript, and chat with its content.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Transcribe a video's audio via the Whisper API
//! - Split the transcript into overlapping chunks and index them in memory
//! - Ask questions answered by an LLM grounded in the retrieved chunks
//! - Search the transcript semantically without generating an answer
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `audio` - Audio download via yt-dlp
//! - `transcription` - Speech-to-text boundary
//! - `chunking` - Sliding-window transcript chunking
//! - `embedding` - Embedding generation
//! - `index` - In-memory vector index
//! - `retrieval` - Query-time retrieval
//! - `rag` - Prompt assembly and answer generation
//! - `pipeline` - End-to-end coordination and state
//! - `server` - HTTP API over the pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     let result = pipeline
//!         .process_video("https://www.youtube.com/watch?v=cdiD-9MMpb0")
//!         .await?;
//!     println!("Indexed {} chunks", result.chunk_count);
//!
//!     let answer = pipeline.query("What is the video about?", 4).await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod retrieval;
pub mod server;
pub mod transcription;

pub use error::{Result, SvarError};
