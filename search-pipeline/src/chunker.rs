//! # Post-Processor Pipeline (C6): fixed-size-with-overlap chunker
//!
//! The minimum needed to exercise the chunk `position`/id-derivation
//! invariants (§9 C): splits a document's content into `chunk_size`-byte
//! windows, overlapping by `overlap` bytes, assigning dense 0-based
//! `position`s. Splits on UTF-8 char boundaries, never mid-codepoint.

use async_trait::async_trait;

use search_traits::pipeline::{ChunkDraft, NormalisedDocument, PostProcessor, ProcessorOptions};
use search_traits::Result;

pub struct FixedSizeOverlapChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeOverlapChunker {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 100;

    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");
        Self { chunk_size, overlap }
    }

    pub fn from_options(options: &ProcessorOptions) -> Self {
        Self::new(
            options.get_usize("chunk_size", Self::DEFAULT_CHUNK_SIZE),
            options.get_usize("overlap", Self::DEFAULT_OVERLAP),
        )
    }

    fn split(&self, content: &str) -> Vec<String> {
        if content.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = content.chars().collect();
        let stride = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += stride;
        }

        chunks
    }
}

impl Default for FixedSizeOverlapChunker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE, Self::DEFAULT_OVERLAP)
    }
}

#[async_trait]
impl PostProcessor for FixedSizeOverlapChunker {
    fn name(&self) -> &str {
        "fixed_size_overlap"
    }

    async fn process(
        &self,
        document: &NormalisedDocument,
        chunks: Vec<ChunkDraft>,
    ) -> Result<Vec<ChunkDraft>> {
        // First stage in a configured pipeline: `chunks` is empty and this
        // processor does the actual splitting. A processor configured
        // downstream of it would instead transform the drafts it receives.
        if !chunks.is_empty() {
            return Ok(chunks);
        }

        let drafts = self
            .split(&document.content)
            .into_iter()
            .enumerate()
            .map(|(position, content)| ChunkDraft {
                position: position as u32,
                content,
            })
            .collect();
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc(content: &str) -> NormalisedDocument {
        NormalisedDocument {
            title: "t".to_string(),
            content: content.to_string(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn short_content_produces_one_chunk() {
        let chunker = FixedSizeOverlapChunker::new(1000, 100);
        let drafts = chunker.process(&doc("hello world"), Vec::new()).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].position, 0);
        assert_eq!(drafts[0].content, "hello world");
    }

    #[tokio::test]
    async fn empty_content_produces_no_chunks() {
        let chunker = FixedSizeOverlapChunker::default();
        let drafts = chunker.process(&doc(""), Vec::new()).await.unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn positions_are_dense_and_ordered() {
        let chunker = FixedSizeOverlapChunker::new(10, 2);
        let content: String = "a".repeat(35);
        let drafts = chunker.process(&doc(&content), Vec::new()).await.unwrap();
        for (i, draft) in drafts.iter().enumerate() {
            assert_eq!(draft.position, i as u32);
        }
        assert!(drafts.len() > 1);
    }

    #[tokio::test]
    async fn consecutive_chunks_overlap_by_the_configured_amount() {
        let chunker = FixedSizeOverlapChunker::new(10, 3);
        let content = "abcdefghijklmnopqrstuvwxyz";
        let drafts = chunker.process(&doc(content), Vec::new()).await.unwrap();
        let first_tail = &drafts[0].content[drafts[0].content.len() - 3..];
        let second_head = &drafts[1].content[..3];
        assert_eq!(first_tail, second_head);
    }

    #[tokio::test]
    async fn splits_on_char_boundaries_not_bytes() {
        let chunker = FixedSizeOverlapChunker::new(3, 0);
        let content = "héllo wörld"; // contains multi-byte UTF-8 chars
        let drafts = chunker.process(&doc(content), Vec::new()).await.unwrap();
        let rejoined: String = drafts.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join("");
        assert_eq!(rejoined.chars().count(), content.chars().count());
    }
}
