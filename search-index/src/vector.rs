//! # Vector Index (C3): in-memory brute-force cosine k-NN
//!
//! Adequate for the personal-scale use case the spec implies — no ANN
//! index is specified or required (§9 C). Held behind an async mutex since
//! both `add`/`delete` (writers, from the sync pipeline) and `search`
//! (reader, from the search service) run concurrently.

use async_trait::async_trait;
use tracing::instrument;

use search_async::sync::Mutex;
use search_traits::connector::SyncContext;
use search_traits::index::{check_dimensions, cosine_similarity};
use search_traits::{ChunkId, VectorHit, VectorIndex};

struct Entry {
    chunk_id: ChunkId,
    vector: Vec<f32>,
}

pub struct InMemoryVectorIndex {
    dimensions: usize,
    entries: Mutex<Vec<Entry>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, _ctx, vector), fields(chunk_id = %chunk_id, dims = vector.len()))]
    async fn add(&self, _ctx: &SyncContext, chunk_id: ChunkId, vector: Vec<f32>) -> search_traits::Result<()> {
        check_dimensions(self.dimensions, vector.len())?;

        let mut entries = self.entries.lock().await;
        entries.retain(|e| e.chunk_id != chunk_id);
        entries.push(Entry { chunk_id, vector });
        Ok(())
    }

    async fn delete(&self, _ctx: &SyncContext, chunk_id: ChunkId) -> search_traits::Result<()> {
        let mut entries = self.entries.lock().await;
        entries.retain(|e| e.chunk_id != chunk_id);
        Ok(())
    }

    async fn search(&self, _ctx: &SyncContext, query: &[f32], k: usize) -> search_traits::Result<Vec<VectorHit>> {
        if query.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let entries = self.entries.lock().await;
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .map(|e| VectorHit {
                chunk_id: e.chunk_id,
                similarity: cosine_similarity(query, &e.vector),
            })
            .collect();

        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn close(&self) -> search_traits::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_async::sync::CancellationToken;

    fn ctx() -> SyncContext {
        SyncContext::new(CancellationToken::new())
    }

    #[tokio::test]
    async fn rejects_dimension_mismatch_on_add() {
        let index = InMemoryVectorIndex::new(3);
        let err = index.add(&ctx(), ChunkId::new(), vec![1.0, 0.0]).await.unwrap_err();
        assert_eq!(err.kind, search_traits::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity_descending() {
        let index = InMemoryVectorIndex::new(2);
        let a = ChunkId::new();
        let b = ChunkId::new();
        index.add(&ctx(), a, vec![1.0, 0.0]).await.unwrap();
        index.add(&ctx(), b, vec![0.0, 1.0]).await.unwrap();

        let hits = index.search(&ctx(), &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits[0].chunk_id, a);
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[tokio::test]
    async fn re_adding_same_chunk_replaces_its_vector() {
        let index = InMemoryVectorIndex::new(2);
        let chunk_id = ChunkId::new();
        index.add(&ctx(), chunk_id, vec![1.0, 0.0]).await.unwrap();
        index.add(&ctx(), chunk_id, vec![0.0, 1.0]).await.unwrap();
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn deleted_chunk_is_not_returned() {
        let index = InMemoryVectorIndex::new(2);
        let chunk_id = ChunkId::new();
        index.add(&ctx(), chunk_id, vec![1.0, 0.0]).await.unwrap();
        index.delete(&ctx(), chunk_id).await.unwrap();
        assert!(index.is_empty().await);
    }
}
