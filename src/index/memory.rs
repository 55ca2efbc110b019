//! In-memory vector index.
//!
//! A brute-force linear scan over normalized vectors. For a single video
//! (low thousands of chunks) this is fast enough that no approximate
//! nearest-neighbor structure is warranted.

use super::{dot, normalize, EmbeddedChunk, ScoredChunk, VectorIndex};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use std::sync::RwLock;

/// One fully-built set of embedded chunks.
struct Generation {
    /// Shared vector dimension. None only for an empty generation.
    dimension: Option<usize>,
    /// Chunks in insertion order, vectors L2-normalized.
    entries: Vec<EmbeddedChunk>,
}

/// In-memory vector index holding one generation at a time.
///
/// The generation is replaced wholesale under a short write lock, so readers
/// see either the old generation or the new one, never a mix.
pub struct MemoryIndex {
    generation: RwLock<Option<Generation>>,
}

impl MemoryIndex {
    /// Create an empty, uninitialized index.
    pub fn new() -> Self {
        Self {
            generation: RwLock::new(None),
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn rebuild(&self, mut chunks: Vec<EmbeddedChunk>) -> Result<()> {
        // Validate and normalize before taking the lock, so a failed rebuild
        // never touches the current generation and readers are not blocked
        // on anything but the final swap.
        let dimension = chunks.first().map(|c| c.vector.len());
        if let Some(expected) = dimension {
            if expected == 0 {
                return Err(SvarError::Embedding(
                    "Cannot index zero-length embedding vectors".to_string(),
                ));
            }
            for chunk in &chunks {
                if chunk.vector.len() != expected {
                    return Err(SvarError::DimensionMismatch {
                        expected,
                        actual: chunk.vector.len(),
                    });
                }
            }
        }

        for chunk in &mut chunks {
            normalize(&mut chunk.vector);
        }

        let next = Generation {
            dimension,
            entries: chunks,
        };

        let mut guard = self.generation.write().unwrap();
        *guard = Some(next);
        Ok(())
    }

    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let guard = self.generation.read().unwrap();
        let generation = guard.as_ref().ok_or(SvarError::NotReady)?;

        if generation.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(expected) = generation.dimension {
            if query_vector.len() != expected {
                return Err(SvarError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        let mut query = query_vector.to_vec();
        normalize(&mut query);

        let mut results: Vec<ScoredChunk> = generation
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: dot(&query, &entry.vector),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    fn is_ready(&self) -> bool {
        self.generation.read().unwrap().is_some()
    }

    fn len(&self) -> usize {
        self.generation
            .read()
            .unwrap()
            .as_ref()
            .map(|g| g.entries.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;

    fn chunk(id: usize, text: &str) -> Chunk {
        Chunk {
            id,
            text: text.to_string(),
            start_offset: id * 10,
            end_offset: id * 10 + text.len(),
        }
    }

    fn embedded(id: usize, text: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: chunk(id, text),
            vector,
        }
    }

    #[tokio::test]
    async fn test_uninitialized_index() {
        let index = MemoryIndex::new();
        assert!(!index.is_ready());
        assert_eq!(index.len(), 0);
        assert!(matches!(
            index.search(&[1.0, 0.0], 5).await,
            Err(SvarError::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_empty_rebuild_is_ready() {
        let index = MemoryIndex::new();
        index.rebuild(Vec::new()).await.unwrap();
        assert!(index.is_ready());
        assert_eq!(index.len(), 0);
        assert!(index.search(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_sorted_and_truncated() {
        let index = MemoryIndex::new();
        index
            .rebuild(vec![
                embedded(0, "east", vec![1.0, 0.0]),
                embedded(1, "north", vec![0.0, 1.0]),
                embedded(2, "northeast", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, 0);
        assert_eq!(results[1].chunk.id, 2);
        assert!(results[0].score >= results[1].score);

        // k larger than index size returns everything.
        let all = index.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(all.len(), 3);
        for pair in all.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_best_match_first() {
        // Five chunks where chunk 2 is closest to the query.
        let index = MemoryIndex::new();
        index
            .rebuild(vec![
                embedded(0, "a", vec![1.0, 0.0, 0.0]),
                embedded(1, "b", vec![0.0, 1.0, 0.0]),
                embedded(2, "c", vec![0.1, 0.1, 1.0]),
                embedded(3, "d", vec![-1.0, 0.0, 0.0]),
                embedded(4, "e", vec![0.0, -1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[0.0, 0.0, 1.0], 3).await.unwrap();
        assert_eq!(results[0].chunk.id, 2);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let index = MemoryIndex::new();
        index
            .rebuild(vec![
                embedded(0, "first", vec![0.0, 1.0]),
                embedded(1, "second", vec![0.0, 1.0]),
                embedded(2, "third", vec![0.0, 2.0]), // same direction, same cosine
            ])
            .await
            .unwrap();

        let results = index.search(&[0.0, 1.0], 3).await.unwrap();
        let ids: Vec<usize> = results.iter().map(|r| r.chunk.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_rebuild_rejects_mixed_dimensions() {
        let index = MemoryIndex::new();
        index
            .rebuild(vec![embedded(0, "ok", vec![1.0, 0.0])])
            .await
            .unwrap();

        let err = index
            .rebuild(vec![
                embedded(0, "two", vec![1.0, 0.0]),
                embedded(1, "three", vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SvarError::DimensionMismatch { expected: 2, actual: 3 }
        ));

        // Prior generation survives the failed rebuild.
        assert_eq!(index.len(), 1);
        let results = index.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.text, "ok");
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_query_dimension() {
        let index = MemoryIndex::new();
        index
            .rebuild(vec![embedded(0, "ok", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0], 1).await,
            Err(SvarError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_not_accumulates() {
        let index = MemoryIndex::new();
        let build = vec![
            embedded(0, "a", vec![1.0, 0.0]),
            embedded(1, "b", vec![0.0, 1.0]),
        ];
        index.rebuild(build.clone()).await.unwrap();
        index.rebuild(build).await.unwrap();
        assert_eq!(index.len(), 2);
    }
}
