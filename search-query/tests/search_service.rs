//! Integration tests for the search service (C8) against real index/store
//! implementations and deterministic null embedding/LLM doubles.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use search_async::sync::CancellationToken;
use search_index::{InMemoryVectorIndex, SqliteKeywordIndex};
use search_query::{SearchOptions, SearchService};
use search_runtime::events::{CoreEvent, EventBus, SearchEvent};
use search_store::db::create_test_pool;
use search_store::repositories::{
    ChunkRepository, DocumentRepository, SourceRepository, SqliteChunkRepository,
    SqliteDocumentRepository, SqliteSourceRepository,
};
use search_store::{Chunk, Source};
use search_traits::connector::SyncContext;
use search_traits::services::{ChatMessage, EmbeddingService, LlmService};
use search_traits::{ChunkId, DocumentId, ErrorKind, Result as TraitResult, TraitError, VectorHit, VectorIndex};

const DIMS: usize = 8;

struct NullEmbeddingService;

#[async_trait]
impl EmbeddingService for NullEmbeddingService {
    async fn embed(&self, text: &str) -> TraitResult<Vec<f32>> {
        Ok(text_vector(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn model_name(&self) -> &str {
        "null-embedding"
    }

    async fn ping(&self) -> TraitResult<()> {
        Ok(())
    }
}

fn text_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    for (i, byte) in text.bytes().enumerate() {
        v[i % DIMS] += byte as f32;
    }
    v
}

struct NullLlmService {
    fail: bool,
}

#[async_trait]
impl LlmService for NullLlmService {
    async fn rewrite_query(&self, query: &str) -> TraitResult<String> {
        if self.fail {
            return Err(TraitError::new(ErrorKind::LlmUnavailable, "llm unreachable"));
        }
        Ok(format!("{query} expanded"))
    }

    async fn summarise(&self, _text: &str) -> TraitResult<String> {
        Ok(String::new())
    }

    async fn generate(&self, _prompt: &str) -> TraitResult<String> {
        Ok(String::new())
    }

    async fn chat(&self, _messages: &[ChatMessage]) -> TraitResult<String> {
        Ok(String::new())
    }
}

struct FailingVectorIndex;

#[async_trait]
impl VectorIndex for FailingVectorIndex {
    fn dimensions(&self) -> usize {
        DIMS
    }

    async fn add(&self, _ctx: &SyncContext, _chunk_id: ChunkId, _vector: Vec<f32>) -> TraitResult<()> {
        Ok(())
    }

    async fn delete(&self, _ctx: &SyncContext, _chunk_id: ChunkId) -> TraitResult<()> {
        Ok(())
    }

    async fn search(&self, _ctx: &SyncContext, _query: &[f32], _k: usize) -> TraitResult<Vec<VectorHit>> {
        Err(TraitError::new(ErrorKind::VectorIndexUnavailable, "vector store down"))
    }

    async fn close(&self) -> TraitResult<()> {
        Ok(())
    }
}

fn ctx() -> SyncContext {
    SyncContext::new(CancellationToken::new())
}

struct Fixture {
    documents: Arc<SqliteDocumentRepository>,
    chunks: Arc<SqliteChunkRepository>,
    sources: Arc<SqliteSourceRepository>,
    keyword_index: Arc<SqliteKeywordIndex>,
    vector_index: Arc<InMemoryVectorIndex>,
    events: Arc<EventBus>,
}

async fn build_fixture() -> Fixture {
    let pool = create_test_pool().await.unwrap();
    let sources = Arc::new(SqliteSourceRepository::new(pool.clone()));
    let documents = Arc::new(SqliteDocumentRepository::new(pool.clone()));
    let chunks = Arc::new(SqliteChunkRepository::new(pool.clone()));
    let keyword_index = Arc::new(SqliteKeywordIndex::open("sqlite::memory:").await.unwrap());
    let vector_index = Arc::new(InMemoryVectorIndex::new(DIMS));
    let events = Arc::new(EventBus::new(64));

    Fixture {
        documents,
        chunks,
        sources,
        keyword_index,
        vector_index,
        events,
    }
}

async fn seed_document(fixture: &Fixture, source_id: search_traits::SourceId, uri: &str, content: &str) -> DocumentId {
    let document = fixture
        .documents
        .upsert_by_uri(source_id, uri, uri, content, HashMap::new())
        .await
        .unwrap();

    let chunk = Chunk {
        id: ChunkId::new(),
        document_id: document.id,
        content: content.to_string(),
        position: 0,
        embedding: None,
    };
    fixture
        .chunks
        .replace_for_document(document.id, vec![chunk.clone()])
        .await
        .unwrap();

    fixture
        .keyword_index
        .index(&ctx(), chunk.id, &chunk.content)
        .await
        .unwrap();
    fixture
        .vector_index
        .add(&ctx(), chunk.id, text_vector(&chunk.content))
        .await
        .unwrap();

    document.id
}

#[tokio::test]
async fn text_only_mode_returns_hydrated_results_with_highlights() {
    let fixture = build_fixture().await;
    let source = Source::new("filesystem", "docs");
    fixture.sources.create(&source).await.unwrap();
    seed_document(&fixture, source.id, "file:///a.txt", "the quick brown fox jumps over the lazy dog").await;

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        None,
        None,
        None,
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let results = service
        .search(&ctx(), "quick fox", SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_name, "docs");
    assert!(!results[0].highlights.is_empty());
}

#[tokio::test]
async fn empty_query_returns_no_results_without_touching_the_index() {
    let fixture = build_fixture().await;
    let source = Source::new("filesystem", "docs");
    fixture.sources.create(&source).await.unwrap();
    seed_document(&fixture, source.id, "file:///a.txt", "the quick brown fox").await;

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        None,
        None,
        None,
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let results = service
        .search(&ctx(), "   ", SearchOptions::default())
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn hybrid_mode_fuses_keyword_and_vector_arms() {
    let fixture = build_fixture().await;
    let source = Source::new("filesystem", "docs");
    fixture.sources.create(&source).await.unwrap();
    seed_document(&fixture, source.id, "file:///a.txt", "alpha beta gamma").await;
    seed_document(&fixture, source.id, "file:///b.txt", "delta epsilon zeta").await;

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        Some(fixture.vector_index.clone()),
        Some(Arc::new(NullEmbeddingService)),
        None,
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let mut sub = fixture.events.subscribe();
    let results = service
        .search(
            &ctx(),
            "alpha beta gamma",
            SearchOptions {
                hybrid: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!results.is_empty());
    let event = sub.try_recv().unwrap();
    match event {
        CoreEvent::Search(SearchEvent::Executed { mode, .. }) => assert_eq!(mode, "hybrid"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn hybrid_mode_degrades_to_keyword_when_vector_arm_fails() {
    let fixture = build_fixture().await;
    let source = Source::new("filesystem", "docs");
    fixture.sources.create(&source).await.unwrap();
    seed_document(&fixture, source.id, "file:///a.txt", "resilient search degrades gracefully").await;

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        Some(Arc::new(FailingVectorIndex)),
        Some(Arc::new(NullEmbeddingService)),
        None,
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let mut sub = fixture.events.subscribe();
    let results = service
        .search(
            &ctx(),
            "resilient search",
            SearchOptions {
                semantic: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 1);

    let mut saw_degraded = false;
    while let Ok(event) = sub.try_recv() {
        if let CoreEvent::Search(SearchEvent::ArmDegraded { surviving_arm, .. }) = event {
            assert_eq!(surviving_arm, "keyword");
            saw_degraded = true;
        }
    }
    assert!(saw_degraded);
}

#[tokio::test]
async fn llm_assisted_mode_falls_back_to_original_query_on_rewrite_failure() {
    let fixture = build_fixture().await;
    let source = Source::new("filesystem", "docs");
    fixture.sources.create(&source).await.unwrap();
    seed_document(&fixture, source.id, "file:///a.txt", "original query still matches").await;

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        None,
        None,
        Some(Arc::new(NullLlmService { fail: true })),
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let results = service
        .search(&ctx(), "original query", SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn source_filter_excludes_results_from_other_sources() {
    let fixture = build_fixture().await;
    let source_a = Source::new("filesystem", "a-source");
    let source_b = Source::new("filesystem", "b-source");
    fixture.sources.create(&source_a).await.unwrap();
    fixture.sources.create(&source_b).await.unwrap();
    seed_document(&fixture, source_a.id, "file:///a.txt", "shared term in source a").await;
    seed_document(&fixture, source_b.id, "file:///b.txt", "shared term in source b").await;

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        None,
        None,
        None,
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let results = service
        .search(
            &ctx(),
            "shared term",
            SearchOptions {
                source_ids: Some(vec![source_a.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.source_id, source_a.id);
}

#[tokio::test]
async fn pagination_limits_and_offsets_the_result_page() {
    let fixture = build_fixture().await;
    let source = Source::new("filesystem", "docs");
    fixture.sources.create(&source).await.unwrap();
    for i in 0..5 {
        seed_document(&fixture, source.id, &format!("file:///{i}.txt"), "paged term content").await;
    }

    let service = SearchService::new(
        fixture.keyword_index.clone(),
        None,
        None,
        None,
        fixture.documents.clone(),
        fixture.chunks.clone(),
        fixture.sources.clone(),
        fixture.events.clone(),
    );

    let first_page = service
        .search(
            &ctx(),
            "paged term",
            SearchOptions {
                limit: 2,
                offset: 0,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let second_page = service
        .search(
            &ctx(),
            "paged term",
            SearchOptions {
                limit: 2,
                offset: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(first_page.len(), 2);
    assert_eq!(second_page.len(), 2);
    assert_ne!(first_page[0].document.id, second_page[0].document.id);
}
