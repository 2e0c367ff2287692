//! # Per-document pipeline (§4.3, inside C7)
//!
//! The six strictly-ordered stages the orchestrator runs for every
//! `RawDocument`: exclusion gate, normalise, chunk, embed, persist, index.
//! A failure at any stage aborts just that document — the orchestrator
//! counts it against the sync's `error_count` rather than aborting the
//! whole sync (§7 propagation policy).

use std::sync::Arc;

use thiserror::Error;
use tracing::{instrument, warn};

use search_pipeline::{derive_chunk_id, NormaliserRegistry, PostProcessorPipeline};
use search_store::repositories::{ChunkRepository, DocumentRepository, ExclusionRepository};
use search_store::{Chunk, StoreError};
use search_traits::connector::{RawDocument, SyncContext};
use search_traits::{EmbeddingService, ErrorKind, KeywordIndex, TraitError, VectorIndex};

#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<TraitError> for PipelineError {
    fn from(e: TraitError) -> Self {
        Self {
            kind: e.kind,
            message: e.message,
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        let kind = e.kind();
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// Normalised, chunked, persisted and indexed.
    Indexed {
        document_id: search_traits::DocumentId,
        chunk_count: usize,
    },
    /// Skipped without being counted as an error: either the
    /// `(source_id, uri)` pair is excluded, or the document's URI has a
    /// hidden path segment (§4.1, §8 boundary behaviour).
    Excluded,
}

/// Collaborators the per-document pipeline needs. Constructed once by the
/// orchestrator and shared across every document in a sync.
pub struct DocumentPipeline {
    pub exclusions: Arc<dyn ExclusionRepository>,
    pub normalisers: Arc<NormaliserRegistry>,
    pub chunker: Arc<PostProcessorPipeline>,
    pub documents: Arc<dyn DocumentRepository>,
    pub chunks: Arc<dyn ChunkRepository>,
    pub keyword_index: Arc<dyn KeywordIndex>,
    pub vector_index: Option<Arc<dyn VectorIndex>>,
    pub embedding: Option<Arc<dyn EmbeddingService>>,
}

impl DocumentPipeline {
    #[instrument(skip(self, ctx, raw), fields(uri = %raw.uri))]
    pub async fn process(
        &self,
        ctx: &SyncContext,
        raw: RawDocument,
    ) -> Result<DocumentOutcome, PipelineError> {
        if raw.is_hidden_path() {
            return Ok(DocumentOutcome::Excluded);
        }

        if self.exclusions.is_excluded(raw.source_id, &raw.uri).await? {
            return Ok(DocumentOutcome::Excluded);
        }

        let normalised = self.normalisers.normalise(&raw)?;

        let drafts = self.chunker.process(&normalised).await?;

        // Recheck immediately before persist: resolves the race between a
        // concurrent `exclude()` call and this sync (Open Question (d)).
        if self.exclusions.is_excluded(raw.source_id, &raw.uri).await? {
            return Ok(DocumentOutcome::Excluded);
        }

        let mut embeddings: Vec<Option<Vec<f32>>> = Vec::with_capacity(drafts.len());
        if let Some(embedding_service) = &self.embedding {
            for draft in &drafts {
                let vector = embedding_service
                    .embed(&draft.content)
                    .await
                    .map_err(PipelineError::from)?;
                if let Some(vector_index) = &self.vector_index {
                    if vector.len() != vector_index.dimensions() {
                        return Err(PipelineError::new(
                            ErrorKind::VectorIndexUnavailable,
                            format!(
                                "embedding has {} dimensions, vector index expects {}",
                                vector.len(),
                                vector_index.dimensions()
                            ),
                        ));
                    }
                }
                embeddings.push(Some(vector));
            }
        } else {
            embeddings.resize(drafts.len(), None);
        }

        let document = self
            .documents
            .upsert_by_uri(
                raw.source_id,
                &raw.uri,
                &normalised.title,
                &normalised.content,
                normalised.metadata.clone(),
            )
            .await?;

        let chunk_count = drafts.len();
        let chunks: Vec<Chunk> = drafts
            .into_iter()
            .zip(embeddings.into_iter())
            .map(|(draft, embedding)| Chunk {
                id: derive_chunk_id(document.id, draft.position),
                document_id: document.id,
                content: draft.content,
                position: draft.position,
                embedding,
            })
            .collect();

        self.chunks.replace_for_document(document.id, chunks.clone()).await?;

        for chunk in &chunks {
            if let Err(e) = self.keyword_index.index(ctx, chunk.id, &chunk.content).await {
                warn!(chunk_id = %chunk.id, error = %e, "keyword index write failed");
                return Err(PipelineError::from(e));
            }
            if let (Some(vector_index), Some(embedding)) = (&self.vector_index, &chunk.embedding) {
                vector_index.add(ctx, chunk.id, embedding.clone()).await.map_err(PipelineError::from)?;
            }
        }

        Ok(DocumentOutcome::Indexed {
            document_id: document.id,
            chunk_count,
        })
    }

    /// Handles an incremental `Deleted` change: best-effort index cleanup
    /// (log, don't fail), then remove the document from the store. No-op if
    /// the document doesn't exist (§4.2 per-change semantics).
    #[instrument(skip(self, ctx), fields(uri = %uri))]
    pub async fn process_deletion(
        &self,
        ctx: &SyncContext,
        source_id: search_traits::SourceId,
        uri: &str,
    ) -> Result<(), PipelineError> {
        let Some(document) = self.documents.find_by_uri(source_id, uri).await? else {
            return Ok(());
        };

        let chunk_ids = self.chunks.delete_by_document(document.id).await?;
        for chunk_id in chunk_ids {
            if let Err(e) = self.keyword_index.delete(ctx, chunk_id).await {
                warn!(chunk_id = %chunk_id, error = %e, "keyword index delete failed");
            }
            if let Some(vector_index) = &self.vector_index {
                if let Err(e) = vector_index.delete(ctx, chunk_id).await {
                    warn!(chunk_id = %chunk_id, error = %e, "vector index delete failed");
                }
            }
        }

        self.documents.delete(document.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_index::{InMemoryVectorIndex, SqliteKeywordIndex};
    use search_pipeline::{FixedSizeOverlapChunker, NormaliserRegistry, PostProcessorPipeline};
    use search_store::repositories::{
        ChunkRepository, DocumentRepository, ExclusionRepository, SqliteChunkRepository,
        SqliteDocumentRepository, SqliteExclusionRepository,
    };
    use search_store::create_test_pool;
    use search_traits::{SourceId, TraitError};
    use std::collections::HashMap;

    struct FixedEmbeddingService {
        dimensions: usize,
    }

    #[async_trait]
    impl EmbeddingService for FixedEmbeddingService {
        async fn embed(&self, _text: &str) -> search_traits::Result<Vec<f32>> {
            Ok(vec![0.1; self.dimensions])
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn model_name(&self) -> &str {
            "fixed-test-embedder"
        }

        async fn ping(&self) -> search_traits::Result<()> {
            Ok(())
        }
    }

    fn ctx() -> SyncContext {
        SyncContext::new(search_async::sync::CancellationToken::new())
    }

    fn plain_text_doc(source_id: SourceId, uri: &str, content: &str) -> RawDocument {
        RawDocument {
            source_id,
            uri: uri.to_string(),
            mime_type: "text/plain".to_string(),
            content: Some(content.as_bytes().to_vec()),
            metadata: HashMap::new(),
            parent_uri: None,
        }
    }

    async fn build_pipeline(embedding_dims: Option<usize>, vector_dims: usize) -> DocumentPipeline {
        let pool = create_test_pool().await.unwrap();
        let keyword_index = Arc::new(SqliteKeywordIndex::open("sqlite::memory:").await.unwrap());

        DocumentPipeline {
            exclusions: Arc::new(SqliteExclusionRepository::new(pool.clone())),
            normalisers: Arc::new(NormaliserRegistry::with_defaults()),
            chunker: Arc::new(PostProcessorPipeline::new(vec![Box::new(
                FixedSizeOverlapChunker::new(1000, 100),
            )])),
            documents: Arc::new(SqliteDocumentRepository::new(pool.clone())),
            chunks: Arc::new(SqliteChunkRepository::new(pool.clone())),
            keyword_index,
            vector_index: Some(Arc::new(InMemoryVectorIndex::new(vector_dims))),
            embedding: embedding_dims.map(|d| Arc::new(FixedEmbeddingService { dimensions: d }) as Arc<dyn EmbeddingService>),
        }
    }

    #[tokio::test]
    async fn excluded_uri_is_skipped_without_error() {
        let pipeline = build_pipeline(None, 4).await;
        let source_id = SourceId::new();
        pipeline
            .exclusions
            .exclude(source_id, None, "file:///secret.txt", "user requested")
            .await
            .unwrap();

        let outcome = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///secret.txt", "hello"))
            .await
            .unwrap();

        assert_eq!(outcome, DocumentOutcome::Excluded);
    }

    #[tokio::test]
    async fn hidden_path_is_skipped_without_error() {
        let pipeline = build_pipeline(None, 4).await;
        let source_id = SourceId::new();

        let outcome = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///.hidden/notes.txt", "hello"))
            .await
            .unwrap();

        assert_eq!(outcome, DocumentOutcome::Excluded);
    }

    #[tokio::test]
    async fn unrecognised_mime_type_is_not_implemented() {
        let pipeline = build_pipeline(None, 4).await;
        let source_id = SourceId::new();
        let mut raw = plain_text_doc(source_id, "file:///archive.zip", "binary");
        raw.mime_type = "application/zip".to_string();

        let err = pipeline.process(&ctx(), raw).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotImplemented);
    }

    #[tokio::test]
    async fn embedding_dimension_mismatch_is_vector_index_unavailable() {
        let pipeline = build_pipeline(Some(3), 8).await;
        let source_id = SourceId::new();

        let err = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///a.txt", "hello world"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::VectorIndexUnavailable);
    }

    #[tokio::test]
    async fn successful_document_is_persisted_and_indexed() {
        let pipeline = build_pipeline(Some(4), 4).await;
        let source_id = SourceId::new();

        let outcome = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///a.txt", "hello world"))
            .await
            .unwrap();

        let DocumentOutcome::Indexed { document_id, chunk_count } = outcome else {
            panic!("expected Indexed outcome");
        };
        assert_eq!(chunk_count, 1);

        let chunks = pipeline.chunks.list_by_document(document_id).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].embedding.is_some());

        let hits = pipeline
            .keyword_index
            .search(&ctx(), "hello", 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn reprocessing_same_uri_reuses_the_document_id() {
        let pipeline = build_pipeline(None, 4).await;
        let source_id = SourceId::new();

        let first = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///a.txt", "hello"))
            .await
            .unwrap();
        let second = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///a.txt", "hello again"))
            .await
            .unwrap();

        let (DocumentOutcome::Indexed { document_id: id1, .. }, DocumentOutcome::Indexed { document_id: id2, .. }) =
            (first, second)
        else {
            panic!("expected both outcomes to be Indexed");
        };
        assert_eq!(id1, id2);
    }

    #[tokio::test]
    async fn deleting_a_missing_document_is_a_no_op() {
        let pipeline = build_pipeline(None, 4).await;
        let source_id = SourceId::new();
        pipeline
            .process_deletion(&ctx(), source_id, "file:///never-synced.txt")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_an_existing_document_removes_its_chunks() {
        let pipeline = build_pipeline(None, 4).await;
        let source_id = SourceId::new();

        let outcome = pipeline
            .process(&ctx(), plain_text_doc(source_id, "file:///a.txt", "hello world"))
            .await
            .unwrap();
        let DocumentOutcome::Indexed { document_id, .. } = outcome else {
            panic!("expected Indexed outcome");
        };

        pipeline
            .process_deletion(&ctx(), source_id, "file:///a.txt")
            .await
            .unwrap();

        let err = pipeline.documents.get(document_id).await.unwrap_err();
        assert_eq!(err.kind(), search_traits::ErrorKind::NotFound);

        let hits = pipeline.keyword_index.search(&ctx(), "hello", 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn pipeline_error_from_trait_error_preserves_kind() {
        let trait_err = TraitError::new(ErrorKind::RateLimited, "slow down");
        let pipeline_err = PipelineError::from(trait_err);
        assert_eq!(pipeline_err.kind, ErrorKind::RateLimited);
    }
}
