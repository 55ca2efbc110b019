//! Query-time retrieval: embed the question, search the index.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, SvarError};
use crate::index::{ScoredChunk, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retrieves the chunks most relevant to a question.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Create a new retriever over an index and embedder.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Retrieve up to `k` chunks, most relevant first.
    ///
    /// Scores are dropped at this boundary; callers that need them use the
    /// index directly.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Chunk>> {
        let results = self.retrieve_scored(question, k).await?;
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }

    /// Retrieve up to `k` chunks with their similarity scores.
    pub async fn retrieve_scored(&self, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if !self.index.is_ready() {
            return Err(SvarError::NotReady);
        }

        let query_vector = self.embedder.embed(question).await?;

        let expected = self.embedder.dimensions();
        if query_vector.len() != expected {
            return Err(SvarError::DimensionMismatch {
                expected,
                actual: query_vector.len(),
            });
        }

        let results = self.index.search(&query_vector, k).await?;
        debug!("Retrieved {} chunks for query", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::index::{EmbeddedChunk, MemoryIndex};
    use async_trait::async_trait;

    /// Embedder that maps known words to fixed vectors.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(match text {
                t if t.contains("north") => vec![0.0, 1.0],
                t if t.contains("east") => vec![1.0, 0.0],
                _ => vec![0.5, 0.5],
            })
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Embedder whose vectors disagree with its declared dimensions.
    struct LyingEmbedder;

    #[async_trait]
    impl Embedder for LyingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0, 0.0]; texts.len()])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn embedded(id: usize, text: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: Chunk {
                id,
                text: text.to_string(),
                start_offset: 0,
                end_offset: text.len(),
            },
            vector,
        }
    }

    #[tokio::test]
    async fn test_retrieve_before_ingest_fails() {
        let retriever = Retriever::new(Arc::new(MemoryIndex::new()), Arc::new(KeywordEmbedder));
        assert!(matches!(
            retriever.retrieve("anything", 3).await,
            Err(SvarError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_similarity() {
        let index = Arc::new(MemoryIndex::new());
        index
            .rebuild(vec![
                embedded(0, "going east", vec![1.0, 0.0]),
                embedded(1, "going north", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let retriever = Retriever::new(index, Arc::new(KeywordEmbedder));
        let chunks = retriever.retrieve("which way is north?", 2).await.unwrap();
        assert_eq!(chunks[0].text, "going north");
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_mismatched_query_dimension_rejected() {
        let index = Arc::new(MemoryIndex::new());
        index
            .rebuild(vec![embedded(0, "x", vec![1.0, 0.0])])
            .await
            .unwrap();

        let retriever = Retriever::new(index, Arc::new(LyingEmbedder));
        assert!(matches!(
            retriever.retrieve("q", 1).await,
            Err(SvarError::DimensionMismatch { .. })
        ));
    }
}
