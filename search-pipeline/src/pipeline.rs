//! Ordered post-processor pipeline (§6): `process(ctx, document) ->
//! list<chunk>`. Each stage consumes the previous stage's `ChunkDraft`s;
//! the final stage's output gets deterministic ids assigned by
//! [`derive_chunk_id`].

use search_traits::pipeline::{ChunkDraft, NormalisedDocument, PostProcessor};
use search_traits::{ChunkId, DocumentId, Result};
use uuid::Uuid;

/// Deterministic chunk id derived from `document_id + position` (§4.3 step
/// 3): re-chunking the same document produces the same chunk ids, so a
/// repeated sync with unchanged content is a no-op rather than a stream of
/// duplicate inserts (§8 idempotence property).
pub fn derive_chunk_id(document_id: DocumentId, position: u32) -> ChunkId {
    let namespace = Uuid::NAMESPACE_OID;
    let name = format!("{document_id}:{position}");
    ChunkId::from_uuid(Uuid::new_v5(&namespace, name.as_bytes()))
}

pub struct PostProcessorPipeline {
    stages: Vec<Box<dyn PostProcessor>>,
}

impl PostProcessorPipeline {
    pub fn new(stages: Vec<Box<dyn PostProcessor>>) -> Self {
        Self { stages }
    }

    pub async fn process(&self, document: &NormalisedDocument) -> Result<Vec<ChunkDraft>> {
        let mut chunks = Vec::new();
        for stage in &self.stages {
            chunks = stage.process(document, chunks).await?;
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::FixedSizeOverlapChunker;
    use std::collections::HashMap;

    #[test]
    fn chunk_id_derivation_is_deterministic() {
        let document_id = DocumentId::new();
        let a = derive_chunk_id(document_id, 3);
        let b = derive_chunk_id(document_id, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn chunk_id_derivation_differs_by_position() {
        let document_id = DocumentId::new();
        assert_ne!(derive_chunk_id(document_id, 0), derive_chunk_id(document_id, 1));
    }

    #[tokio::test]
    async fn single_stage_pipeline_produces_chunks() {
        let pipeline = PostProcessorPipeline::new(vec![Box::new(FixedSizeOverlapChunker::new(10, 2))]);
        let document = NormalisedDocument {
            title: "t".to_string(),
            content: "hello world, this is a test document".to_string(),
            metadata: HashMap::new(),
        };
        let chunks = pipeline.process(&document).await.unwrap();
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].position, 0);
    }
}
