//! RAG (Retrieval-Augmented Generation) answer generation.
//!
//! Assembles a prompt from retrieved transcript chunks and delegates
//! completion to a hosted language model.

mod generator;
mod openai;

pub use generator::AnswerGenerator;
pub use openai::OpenAiChatModel;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;

/// A generated answer with the chunks used as context.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// Context chunks, most relevant first. Ephemeral, not persisted.
    pub source_chunks: Vec<Chunk>,
}

/// Trait for language-model completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;
}
