//! # Search Service (C8, §4.4)
//!
//! Mode selection, per-mode execution, RRF fusion, hydration and
//! highlighting, all in one place: the service is the only thing that
//! knows how a `SearchMode` turns into a sequence of index/service calls.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{instrument, warn};

use search_runtime::events::{CoreEvent, EventBus, SearchEvent};
use search_store::repositories::{ChunkRepository, DocumentRepository, SourceRepository};
use search_store::{Chunk, Document};
use search_traits::connector::SyncContext;
use search_traits::index::{KeywordIndex, VectorIndex};
use search_traits::services::{EmbeddingService, LlmService};
use search_traits::{ChunkId, SourceId};

use crate::error::{Result, SearchError};
use crate::fusion::{reciprocal_rank_fusion, RRF_K};
use crate::highlight::highlight;

/// `search()` input (§4.4). `semantic`/`hybrid` are the two explicit mode
/// overrides a caller can request; absent both, the service picks the
/// richest mode the configured services support.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
    pub source_ids: Option<Vec<SourceId>>,
    pub semantic: bool,
    pub hybrid: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            source_ids: None,
            semantic: false,
            hybrid: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub document: Document,
    pub chunk: Chunk,
    pub score: f64,
    pub highlights: Vec<String>,
    pub source_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectiveMode {
    TextOnly,
    Hybrid,
    LlmAssisted,
    Full,
}

impl EffectiveMode {
    fn label(&self) -> &'static str {
        match self {
            EffectiveMode::TextOnly => "text_only",
            EffectiveMode::Hybrid => "hybrid",
            EffectiveMode::LlmAssisted => "llm_assisted",
            EffectiveMode::Full => "full",
        }
    }
}

/// §4.4 mode-selection decision tree.
fn effective_mode(semantic: bool, hybrid: bool, vector_capable: bool, llm_capable: bool) -> EffectiveMode {
    if semantic && vector_capable {
        return EffectiveMode::Hybrid;
    }
    if hybrid {
        return if vector_capable {
            EffectiveMode::Hybrid
        } else {
            EffectiveMode::TextOnly
        };
    }
    if vector_capable && llm_capable {
        EffectiveMode::Full
    } else if vector_capable {
        EffectiveMode::Hybrid
    } else if llm_capable {
        EffectiveMode::LlmAssisted
    } else {
        EffectiveMode::TextOnly
    }
}

/// `limit × 2`, or `× 3` when a source filter will drop some results
/// post-hydration (§4.4): over-fetch enough that filtering doesn't starve
/// the requested page.
fn internal_limit(limit: usize, has_source_filter: bool) -> usize {
    limit.max(1) * if has_source_filter { 3 } else { 2 }
}

pub struct SearchService {
    keyword_index: Arc<dyn KeywordIndex>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    embedding_service: Option<Arc<dyn EmbeddingService>>,
    llm_service: Option<Arc<dyn LlmService>>,
    documents: Arc<dyn DocumentRepository>,
    chunks: Arc<dyn ChunkRepository>,
    sources: Arc<dyn SourceRepository>,
    events: Arc<EventBus>,
}

impl SearchService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        keyword_index: Arc<dyn KeywordIndex>,
        vector_index: Option<Arc<dyn VectorIndex>>,
        embedding_service: Option<Arc<dyn EmbeddingService>>,
        llm_service: Option<Arc<dyn LlmService>>,
        documents: Arc<dyn DocumentRepository>,
        chunks: Arc<dyn ChunkRepository>,
        sources: Arc<dyn SourceRepository>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            keyword_index,
            vector_index,
            embedding_service,
            llm_service,
            documents,
            chunks,
            sources,
            events,
        }
    }

    fn vector_capable(&self) -> bool {
        self.vector_index.is_some() && self.embedding_service.is_some()
    }

    fn llm_capable(&self) -> bool {
        self.llm_service.is_some()
    }

    #[instrument(skip(self, ctx))]
    pub async fn search(&self, ctx: &SyncContext, query: &str, opts: SearchOptions) -> Result<Vec<SearchResult>> {
        if ctx.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let mode = effective_mode(opts.semantic, opts.hybrid, self.vector_capable(), self.llm_capable());
        let limit = internal_limit(opts.limit, opts.source_ids.is_some());

        let (ranked, executed_query) = match mode {
            EffectiveMode::TextOnly => (self.run_keyword(ctx, query, limit).await?, query.to_string()),
            EffectiveMode::Hybrid => (self.run_hybrid(ctx, query, limit).await?, query.to_string()),
            EffectiveMode::LlmAssisted => {
                let rewritten = self.rewrite_or_fallback(query).await;
                (self.run_keyword(ctx, &rewritten, limit).await?, rewritten)
            }
            EffectiveMode::Full => {
                let rewritten = self.rewrite_or_fallback(query).await;
                (self.run_hybrid(ctx, &rewritten, limit).await?, rewritten)
            }
        };

        if ctx.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let mut results = self.hydrate(ranked, &executed_query).await?;

        if let Some(source_ids) = &opts.source_ids {
            let allowed: HashSet<SourceId> = source_ids.iter().copied().collect();
            results.retain(|r| allowed.contains(&r.document.source_id));
        }

        let page = paginate(results, opts.offset, opts.limit);

        self.events
            .emit(CoreEvent::Search(SearchEvent::Executed {
                mode: mode.label().to_string(),
                result_count: page.len(),
                duration_ms: start.elapsed().as_millis() as u64,
            }))
            .ok();

        Ok(page)
    }

    async fn run_keyword(&self, ctx: &SyncContext, query: &str, limit: usize) -> Result<Vec<(ChunkId, f64)>> {
        let hits = self.keyword_index.search(ctx, query, limit).await?;
        Ok(hits.into_iter().map(|h| (h.chunk_id, h.score)).collect())
    }

    async fn run_hybrid(&self, ctx: &SyncContext, query: &str, limit: usize) -> Result<Vec<(ChunkId, f64)>> {
        let keyword_fut = self.keyword_index.search(ctx, query, limit);
        let vector_fut = async {
            // `vector_capable()` gated this call: both are `Some` here for
            // every caller of `run_hybrid`.
            let embedding_service = self
                .embedding_service
                .as_ref()
                .expect("run_hybrid requires an embedding service");
            let vector_index = self
                .vector_index
                .as_ref()
                .expect("run_hybrid requires a vector index");
            let query_vector = embedding_service.embed(query).await?;
            vector_index.search(ctx, &query_vector, limit).await
        };

        let (keyword_result, vector_result) = tokio::join!(keyword_fut, vector_fut);

        match (keyword_result, vector_result) {
            (Ok(k), Ok(v)) => {
                let list1: Vec<ChunkId> = k.into_iter().map(|h| h.chunk_id).collect();
                let list2: Vec<ChunkId> = v.into_iter().map(|h| h.chunk_id).collect();
                Ok(reciprocal_rank_fusion(&list1, &list2, RRF_K))
            }
            (Ok(k), Err(e)) => {
                self.emit_degraded("keyword", &e.to_string());
                let list1: Vec<ChunkId> = k.into_iter().map(|h| h.chunk_id).collect();
                Ok(reciprocal_rank_fusion(&list1, &[], RRF_K))
            }
            (Err(e), Ok(v)) => {
                self.emit_degraded("vector", &e.to_string());
                let list2: Vec<ChunkId> = v.into_iter().map(|h| h.chunk_id).collect();
                Ok(reciprocal_rank_fusion(&[], &list2, RRF_K))
            }
            (Err(ek), Err(ev)) => Err(SearchError::BothArmsFailed {
                keyword: ek.to_string(),
                vector: ev.to_string(),
            }),
        }
    }

    fn emit_degraded(&self, surviving_arm: &str, reason: &str) {
        warn!(surviving_arm, reason, "hybrid search degraded to a single arm");
        self.events
            .emit(CoreEvent::Search(SearchEvent::ArmDegraded {
                surviving_arm: surviving_arm.to_string(),
                reason: reason.to_string(),
            }))
            .ok();
    }

    /// Falls back to the original query on any rewrite failure (§4.4, §7):
    /// a broken LLM provider degrades search quality, it never breaks search.
    async fn rewrite_or_fallback(&self, query: &str) -> String {
        let Some(llm) = &self.llm_service else {
            return query.to_string();
        };
        match llm.rewrite_query(query).await {
            Ok(rewritten) => {
                self.events
                    .emit(CoreEvent::Search(SearchEvent::QueryRewritten {
                        original_len: query.len(),
                        rewritten_len: rewritten.len(),
                    }))
                    .ok();
                rewritten
            }
            Err(e) => {
                warn!(error = %e, "query rewrite failed, falling back to the original query");
                query.to_string()
            }
        }
    }

    /// Fetches chunk, then parent document, then source name, for each
    /// ranked id. Any missing link in that chain is a deletion race, not
    /// an error (§4.4): the id is skipped silently.
    async fn hydrate(&self, ranked: Vec<(ChunkId, f64)>, query: &str) -> Result<Vec<SearchResult>> {
        let mut results = Vec::with_capacity(ranked.len());
        for (chunk_id, score) in ranked {
            let chunk = match self.chunks.get(chunk_id).await {
                Ok(chunk) => chunk,
                Err(_) => continue,
            };
            let document = match self.documents.get(chunk.document_id).await {
                Ok(document) => document,
                Err(_) => continue,
            };
            let source_name = match self.sources.get(document.source_id).await {
                Ok(source) => source.name,
                Err(_) => continue,
            };
            let highlights = highlight(&chunk.content, query);
            results.push(SearchResult {
                document,
                chunk,
                score,
                highlights,
                source_name,
            });
        }
        Ok(results)
    }
}

fn paginate(mut results: Vec<SearchResult>, offset: usize, limit: usize) -> Vec<SearchResult> {
    if offset >= results.len() {
        return Vec::new();
    }
    let end = (offset + limit).min(results.len());
    results.drain(offset..end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_flag_prefers_hybrid_when_vector_capable() {
        assert_eq!(effective_mode(true, false, true, false), EffectiveMode::Hybrid);
    }

    #[test]
    fn semantic_flag_is_ignored_without_vector_capability() {
        assert_eq!(effective_mode(true, false, false, true), EffectiveMode::LlmAssisted);
    }

    #[test]
    fn hybrid_flag_degrades_to_text_only_without_vector_capability() {
        assert_eq!(effective_mode(false, true, false, false), EffectiveMode::TextOnly);
    }

    #[test]
    fn best_available_prefers_full_over_hybrid_over_llm_over_text() {
        assert_eq!(effective_mode(false, false, true, true), EffectiveMode::Full);
        assert_eq!(effective_mode(false, false, true, false), EffectiveMode::Hybrid);
        assert_eq!(effective_mode(false, false, false, true), EffectiveMode::LlmAssisted);
        assert_eq!(effective_mode(false, false, false, false), EffectiveMode::TextOnly);
    }

    #[test]
    fn internal_limit_triples_when_a_source_filter_is_present() {
        assert_eq!(internal_limit(10, false), 20);
        assert_eq!(internal_limit(10, true), 30);
    }

    #[test]
    fn paginate_slices_the_requested_window() {
        let results: Vec<SearchResult> = (0..5)
            .map(|i| SearchResult {
                document: test_document(),
                chunk: test_chunk(i),
                score: 1.0,
                highlights: Vec::new(),
                source_name: "src".to_string(),
            })
            .collect();
        let page = paginate(results, 2, 2);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].chunk.position, 2);
    }

    #[test]
    fn paginate_past_the_end_returns_empty() {
        let results: Vec<SearchResult> = (0..3)
            .map(|i| SearchResult {
                document: test_document(),
                chunk: test_chunk(i),
                score: 1.0,
                highlights: Vec::new(),
                source_name: "src".to_string(),
            })
            .collect();
        assert!(paginate(results, 10, 5).is_empty());
    }

    fn test_document() -> Document {
        use chrono::Utc;
        use std::collections::HashMap;
        Document {
            id: search_traits::DocumentId::new(),
            source_id: SourceId::new(),
            uri: "file:///a.txt".to_string(),
            title: "a".to_string(),
            content: "hello".to_string(),
            metadata: HashMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_chunk(position: u32) -> Chunk {
        Chunk {
            id: ChunkId::new(),
            document_id: search_traits::DocumentId::new(),
            content: "hello world".to_string(),
            position,
            embedding: None,
        }
    }
}
