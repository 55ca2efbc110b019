//! Vector index abstraction for Svar.
//!
//! Provides a trait-based interface so the in-memory index can be swapped
//! for an external vector database without changing callers.

mod memory;

pub use memory::MemoryIndex;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    /// The transcript chunk.
    pub chunk: Chunk,
    /// Embedding vector. All vectors in one index generation must share
    /// the same dimension.
    pub vector: Vec<f32>,
}

/// A search result with similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace all prior content with a new generation of embedded chunks.
    ///
    /// Fails with `DimensionMismatch` if the input vectors have inconsistent
    /// lengths; on failure the prior generation is left untouched.
    async fn rebuild(&self, chunks: Vec<EmbeddedChunk>) -> Result<()>;

    /// Return up to `k` chunks sorted by descending similarity.
    ///
    /// Ties keep original insertion order.
    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Whether a generation has been built.
    fn is_ready(&self) -> bool;

    /// Number of chunks in the current generation.
    fn len(&self) -> usize;

    /// Whether the current generation is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// L2-normalize a vector in place. Zero vectors are left as-is.
pub(crate) fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product of two equal-length vectors.
///
/// Over L2-normalized vectors this is the cosine similarity.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_and_dot() {
        let mut a = vec![3.0, 4.0];
        normalize(&mut a);
        assert!((a[0] - 0.6).abs() < 1e-6);
        assert!((a[1] - 0.8).abs() < 1e-6);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
