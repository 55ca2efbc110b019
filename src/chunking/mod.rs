//! Transcript chunking for retrieval.
//!
//! Splits a transcript into overlapping fixed-size text chunks. The window
//! slides by `max_chars - overlap_chars` bytes, so consecutive chunks share
//! an overlap region and no part of the transcript falls between chunks.

use crate::error::{Result, SvarError};
use serde::{Deserialize, Serialize};

/// A contiguous segment of a transcript used as a retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence ordinal within the transcript (0-based).
    pub id: usize,
    /// Text content of this chunk.
    pub text: String,
    /// Byte offset where this chunk starts in the transcript.
    pub start_offset: usize,
    /// Byte offset one past the end of this chunk.
    pub end_offset: usize,
}

/// Sliding-window chunker.
///
/// Boundaries may split words; offsets are snapped to UTF-8 character
/// boundaries so slicing never panics.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker, validating the window configuration.
    ///
    /// `overlap >= max_chars` would make the cursor stand still, so it is
    /// rejected up front instead of looping.
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(SvarError::Config(
                "chunking.max_chars must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_chars {
            return Err(SvarError::Config(format!(
                "chunking.overlap_chars ({}) must be smaller than chunking.max_chars ({})",
                overlap, max_chars
            )));
        }
        Ok(Self { max_chars, overlap })
    }

    /// Maximum chunk size in bytes.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Overlap between consecutive chunks in bytes.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split a transcript into ordered, overlapping chunks.
    ///
    /// Empty text yields no chunks; text shorter than the window yields a
    /// single chunk covering the whole text. The same input always produces
    /// the same chunk sequence.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let len = text.len();
        let mut chunks = Vec::new();
        if len == 0 {
            return chunks;
        }

        let step = self.max_chars - self.overlap;
        let mut cursor = 0usize;

        loop {
            let mut end = snap_down(text, (cursor + self.max_chars).min(len));
            if end <= cursor {
                // Window narrower than the character at the cursor; take the
                // whole character rather than emit an empty chunk.
                end = snap_up(text, cursor + 1);
            }
            chunks.push(Chunk {
                id: chunks.len(),
                text: text[cursor..end].to_string(),
                start_offset: cursor,
                end_offset: end,
            });

            if end == len {
                break;
            }

            let mut next = snap_down(text, cursor + step);
            if next <= cursor {
                // A multi-byte character swallowed the whole step.
                next = snap_up(text, cursor + 1);
            }
            cursor = next;
        }

        chunks
    }
}

/// Largest char boundary at or below `idx`.
fn snap_down(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char boundary at or above `idx`.
fn snap_up(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_config() {
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(100, 150).is_err());
        assert!(Chunker::new(100, 99).is_ok());
        assert!(Chunker::new(100, 0).is_ok());
    }

    #[test]
    fn test_empty_text() {
        let chunker = Chunker::new(100, 20).unwrap();
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = Chunker::new(100, 20).unwrap();
        let chunks = chunker.split("hello world");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].end_offset, 11);
    }

    #[test]
    fn test_offsets_for_2500_char_transcript() {
        let text = "a".repeat(2500);
        let chunker = Chunker::new(1000, 200).unwrap();
        let chunks = chunker.split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!((chunks[0].start_offset, chunks[0].end_offset), (0, 1000));
        assert_eq!((chunks[1].start_offset, chunks[1].end_offset), (800, 1800));
        assert_eq!((chunks[2].start_offset, chunks[2].end_offset), (1600, 2500));
    }

    #[test]
    fn test_chunk_count_formula() {
        // count = ceil((len - overlap) / (max - overlap)) for non-empty text
        let cases = [(2500, 1000, 200), (1000, 1000, 0), (1001, 1000, 200), (5000, 500, 100)];
        for (len, max, overlap) in cases {
            let text = "x".repeat(len);
            let chunks = Chunker::new(max, overlap).unwrap().split(&text);
            let expected = (len - overlap).div_ceil(max - overlap);
            assert_eq!(chunks.len(), expected, "len={} max={} overlap={}", len, max, overlap);
        }
    }

    #[test]
    fn test_coverage_has_no_gaps() {
        let text: String = (0..997).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunker = Chunker::new(120, 30).unwrap();
        let chunks = chunker.split(&text);

        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks.last().unwrap().end_offset, text.len());
        for pair in chunks.windows(2) {
            // Next chunk starts inside the previous one (the overlap region).
            assert!(pair[1].start_offset <= pair[0].end_offset);
            assert!(pair[1].start_offset > pair[0].start_offset);
            assert_eq!(pair[1].id, pair[0].id + 1);
        }
        for chunk in &chunks {
            assert!(chunk.end_offset - chunk.start_offset <= 120);
            assert_eq!(&text[chunk.start_offset..chunk.end_offset], chunk.text);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunker = Chunker::new(200, 50).unwrap();
        assert_eq!(chunker.split(&text), chunker.split(&text));
    }

    #[test]
    fn test_multibyte_boundaries() {
        // Norwegian text with 2-byte characters; boundaries must not split them.
        let text = "blåbærsyltetøy på brødskiva ".repeat(30);
        let chunker = Chunker::new(64, 16).unwrap();
        let chunks = chunker.split(&text);

        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks.last().unwrap().end_offset, text.len());
        for chunk in &chunks {
            // Slicing already proves boundaries are valid; also check size.
            assert!(chunk.text.len() <= 64);
            assert!(!chunk.text.is_empty());
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start_offset <= pair[0].end_offset);
        }
    }

    #[test]
    fn test_window_smaller_than_character() {
        // A 1-byte window cannot hold a 2-byte character; the chunk still
        // has to carry it so no text is lost.
        let chunks = Chunker::new(1, 0).unwrap().split("ñx");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "ñ");
        assert_eq!((chunks[0].start_offset, chunks[0].end_offset), (0, 2));
        assert_eq!(chunks[1].text, "x");
        assert_eq!((chunks[1].start_offset, chunks[1].end_offset), (2, 3));

        let text = "blåbær";
        let chunks = Chunker::new(2, 1).unwrap().split(text);
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks.last().unwrap().end_offset, text.len());
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert_eq!(&text[chunk.start_offset..chunk.end_offset], chunk.text);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start_offset <= pair[0].end_offset);
        }
    }
}
