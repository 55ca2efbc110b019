//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{Result, SvarError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Duration;
use tracing::{debug, instrument};

/// Maximum number of inputs per embeddings API request.
const BATCH_SIZE: usize = 100;

/// Maximum number of in-flight embedding requests.
const MAX_CONCURRENT_BATCHES: usize = 4;

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Self {
        Self::with_config("text-embedding-3-small", 1536, Duration::from_secs(300))
    }

    /// Create a new OpenAI embedder with custom model, dimensions, and timeout.
    pub fn with_config(model: &str, dimensions: usize, timeout: Duration) -> Self {
        Self {
            client: create_client_with_timeout(timeout),
            model: model.to_string(),
            dimensions,
        }
    }

    async fn embed_one_batch(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(input))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| SvarError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Embedding API error: {}", e)))?;

        // Sort by index to ensure correct order within the batch
        let mut data: Vec<_> = response.data.into_iter().collect();
        data.sort_by_key(|e| e.index);

        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}

impl Default for OpenAIEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SvarError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // Submit API batches concurrently; `buffered` preserves input order.
        // Batches are owned Vecs so the stream closure borrows nothing from
        // the input slice.
        let batches: Vec<Vec<Vec<f32>>> = stream::iter(partition_batches(texts))
            .map(|batch| self.embed_one_batch(batch))
            .buffered(MAX_CONCURRENT_BATCHES)
            .try_collect()
            .await?;

        let all_embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Split inputs into owned, API-sized batches, preserving order.
fn partition_batches(texts: &[String]) -> Vec<Vec<String>> {
    texts.chunks(BATCH_SIZE).map(|chunk| chunk.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_batches_sizes_and_order() {
        let texts: Vec<String> = (0..250).map(|i| i.to_string()).collect();
        let batches = partition_batches(&texts);

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 100);
        assert_eq!(batches[1].len(), 100);
        assert_eq!(batches[2].len(), 50);
        let flattened: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, texts);
    }

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::new();
        assert_eq!(embedder.dimensions(), 1536);

        let embedder =
            OpenAIEmbedder::with_config("text-embedding-3-large", 3072, Duration::from_secs(60));
        assert_eq!(embedder.dimensions(), 3072);
    }
}
