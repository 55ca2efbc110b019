//! Pipeline controller for Svar.
//!
//! Wires ingestion (transcript -> chunks -> embeddings -> index) and query
//! (question -> retrieval -> answer) end to end. The pipeline is an
//! explicitly owned object; nothing here is process-global, so multiple
//! independent instances can coexist.

use crate::chunking::{Chunk, Chunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::index::{EmbeddedChunk, MemoryIndex, VectorIndex};
use crate::rag::{Answer, AnswerGenerator, ChatModel, OpenAiChatModel};
use crate::retrieval::Retriever;
use crate::transcription::{Transcriber, Transcript, WhisperTranscriber};
use std::sync::{Arc, RwLock};
use tracing::{info, instrument};

/// Result of ingesting a transcript.
#[derive(Debug, Clone, Copy)]
pub struct IngestionResult {
    /// Number of chunks indexed.
    pub chunk_count: usize,
}

/// Result of processing a video end to end.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Video title.
    pub title: String,
    /// Length of the transcript in characters.
    pub transcript_chars: usize,
    /// Number of chunks indexed.
    pub chunk_count: usize,
}

/// Current pipeline status.
#[derive(Debug, Clone)]
pub struct Status {
    /// Whether a video has been processed and the index is queryable.
    pub ready: bool,
    /// Number of chunks in the current index generation.
    pub chunk_count: usize,
    /// Title of the currently indexed video, if any.
    pub video_title: Option<String>,
}

/// The RAG pipeline: holds the index for exactly one video at a time.
pub struct Pipeline {
    chunker: Chunker,
    transcriber: Arc<dyn Transcriber>,
    embedder: Arc<dyn Embedder>,
    generator: AnswerGenerator,
    index: Arc<dyn VectorIndex>,
    retriever: Retriever,
    transcript: RwLock<Option<Transcript>>,
    // Serializes ingestions; embedding happens under this lock but queries
    // keep reading the previous index generation until the final swap.
    ingest_lock: tokio::sync::Mutex<()>,
}

impl Pipeline {
    /// Create a pipeline from settings, using the OpenAI-backed components.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(settings.rag.prompts_dir.as_deref())?;
        let timeout = settings.request_timeout();

        let chunker = Chunker::new(settings.chunking.max_chars, settings.chunking.overlap_chars)?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(
            &settings.transcription.model,
            settings.transcription.max_duration_seconds,
            settings.temp_dir(),
            timeout,
        ));

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            timeout,
        ));

        let chat_model: Arc<dyn ChatModel> =
            Arc::new(OpenAiChatModel::new(&settings.rag.model, timeout));

        Ok(Self::with_components(
            chunker, transcriber, embedder, chat_model, prompts, settings,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        chunker: Chunker,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
        prompts: Prompts,
        settings: &Settings,
    ) -> Self {
        let index: Arc<dyn VectorIndex> = Arc::new(MemoryIndex::new());
        let retriever = Retriever::new(index.clone(), embedder.clone());
        let generator = AnswerGenerator::new(
            chat_model,
            prompts,
            settings.rag.temperature,
            settings.rag.max_tokens,
        );

        Self {
            chunker,
            transcriber,
            embedder,
            generator,
            index,
            retriever,
            transcript: RwLock::new(None),
            ingest_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Process a video end to end: transcribe, chunk, embed, and index.
    #[instrument(skip(self), fields(video_url = %video_url))]
    pub async fn process_video(&self, video_url: &str) -> Result<ProcessResult> {
        let transcript = self.transcriber.transcribe(video_url).await?;
        let title = transcript.title.clone();
        let transcript_chars = transcript.text.len();

        info!("Transcribed '{}' ({} chars)", title, transcript_chars);

        let result = self.ingest(transcript).await?;

        Ok(ProcessResult {
            title,
            transcript_chars,
            chunk_count: result.chunk_count,
        })
    }

    /// Ingest a transcript, replacing any previously indexed video.
    ///
    /// On failure the prior index and transcript are left untouched; a
    /// reader never observes a partially-built index.
    #[instrument(skip(self, transcript), fields(title = %transcript.title))]
    pub async fn ingest(&self, transcript: Transcript) -> Result<IngestionResult> {
        let _guard = self.ingest_lock.lock().await;

        let chunks = self.chunker.split(&transcript.text);
        info!("Chunked transcript into {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(SvarError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let expected = self.embedder.dimensions();
        for vector in &vectors {
            if vector.len() != expected {
                return Err(SvarError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector })
            .collect();

        let chunk_count = embedded.len();
        self.index.rebuild(embedded).await?;

        *self.transcript.write().unwrap() = Some(transcript);

        info!("Indexed {} chunks", chunk_count);
        Ok(IngestionResult { chunk_count })
    }

    /// Answer a question about the indexed video.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn query(&self, question: &str, k: usize) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(SvarError::InvalidInput("Question cannot be empty".to_string()));
        }

        let chunks = self.retriever.retrieve(question, k).await?;
        self.generator.answer(question, chunks).await
    }

    /// Retrieve relevant chunks without generating an answer.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        if query.trim().is_empty() {
            return Err(SvarError::InvalidInput("Query cannot be empty".to_string()));
        }

        self.retriever.retrieve(query, k).await
    }

    /// Current pipeline status.
    pub fn status(&self) -> Status {
        Status {
            ready: self.index.is_ready(),
            chunk_count: self.index.len(),
            video_title: self
                .transcript
                .read()
                .unwrap()
                .as_ref()
                .map(|t| t.title.clone()),
        }
    }

    /// Full transcript of the currently indexed video, if any.
    pub fn transcript(&self) -> Option<Transcript> {
        self.transcript.read().unwrap().clone()
    }
}
