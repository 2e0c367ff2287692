//! # Keyword Index (C2) and Vector Index (C3) contracts
//!
//! Both indexes are opaque to the search service and orchestrator beyond
//! these methods: ranking and k-NN strategy are the implementation's
//! concern, scores/similarities are treated as monotone-better reals.

use async_trait::async_trait;

use crate::error::{Result, TraitError};
use crate::ids::ChunkId;
use crate::connector::SyncContext;

/// A keyword index hit. `score` is opaque and monotone-better (§4.5); the
/// search service never interprets its scale beyond ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordHit {
    pub chunk_id: ChunkId,
    pub score: f64,
}

/// A vector index hit. `similarity` is cosine similarity in `[0, 1]`,
/// higher is better (§4.6).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub chunk_id: ChunkId,
    pub similarity: f32,
}

#[async_trait]
pub trait KeywordIndex: Send + Sync {
    /// Indexes (or re-indexes) the text of one chunk.
    async fn index(&self, ctx: &SyncContext, chunk_id: ChunkId, text: &str) -> Result<()>;

    async fn delete(&self, ctx: &SyncContext, chunk_id: ChunkId) -> Result<()>;

    async fn search(&self, ctx: &SyncContext, query: &str, limit: usize) -> Result<Vec<KeywordHit>>;

    /// Idempotent teardown.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// The embedding dimensionality this index is configured for. `add`
    /// must reject vectors of any other length with `InvalidInput`.
    fn dimensions(&self) -> usize;

    async fn add(&self, ctx: &SyncContext, chunk_id: ChunkId, vector: Vec<f32>) -> Result<()>;

    async fn delete(&self, ctx: &SyncContext, chunk_id: ChunkId) -> Result<()>;

    async fn search(&self, ctx: &SyncContext, query: &[f32], k: usize) -> Result<Vec<VectorHit>>;

    async fn close(&self) -> Result<()>;
}

/// Cosine similarity helper shared by vector index implementations and
/// tests. Returns `0.0` for a zero-length vector rather than dividing by
/// zero, since the personal-scale reference implementation never needs to
/// distinguish "orthogonal" from "undefined" at this layer.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Helper for implementations to reject a dimension mismatch on `add`.
pub fn check_dimensions(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(TraitError::new(
            crate::error::ErrorKind::InvalidInput,
            format!("embedding has {actual} dimensions, index expects {expected}"),
        ));
    }
    Ok(())
}
