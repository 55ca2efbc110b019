//! Answer generation from retrieved context.

use super::{Answer, ChatModel};
use crate::chunking::Chunk;
use crate::config::Prompts;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Generates answers by assembling a prompt from context chunks and
/// delegating completion to a [`ChatModel`].
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    temperature: f32,
    max_tokens: u32,
}

impl AnswerGenerator {
    /// Create a new answer generator with fixed sampling parameters.
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            prompts,
            temperature,
            max_tokens,
        }
    }

    /// Answer a question given context chunks, most relevant first.
    ///
    /// With no context, the prompt states explicitly that nothing was found
    /// so the model can decline to speculate. Completion failures surface as
    /// errors; retry policy belongs to the caller.
    #[instrument(skip(self, context_chunks), fields(chunks = context_chunks.len()))]
    pub async fn answer(&self, question: &str, context_chunks: Vec<Chunk>) -> Result<Answer> {
        let prompt = self.build_prompt(question, &context_chunks);
        debug!("Assembled prompt of {} chars", prompt.len());

        let text = self
            .model
            .complete(&self.prompts.rag.system, &prompt, self.temperature, self.max_tokens)
            .await?;

        Ok(Answer {
            text,
            source_chunks: context_chunks,
        })
    }

    /// Assemble the user prompt. Deterministic: fixed template, chunks in
    /// the order given (index order = relevance order).
    fn build_prompt(&self, question: &str, context_chunks: &[Chunk]) -> String {
        let context = if context_chunks.is_empty() {
            self.prompts.rag.no_context.clone()
        } else {
            context_chunks
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context);
        vars.insert("question".to_string(), question.to_string());

        Prompts::render(&self.prompts.rag.user, &vars)
    }
}
