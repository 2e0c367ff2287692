//! # Reciprocal Rank Fusion (§4.4)
//!
//! Merges two independently ranked chunk-id lists into one, without ever
//! comparing a keyword score to a cosine similarity directly — only rank
//! position matters.

use std::collections::{HashMap, HashSet};

use search_traits::ChunkId;

/// Reciprocal rank fusion constant. Larger `k` flattens the influence of
/// rank differences; 60 is the standard value from the original RRF paper
/// and the one named by the spec.
pub const RRF_K: f64 = 60.0;

/// Fuses `list1` and `list2` (each already ranked best-first) into one
/// list ordered descending by accumulated RRF score. A chunk present in
/// both lists accumulates both contributions. Ties are broken by first
/// appearance in `list1`, then `list2` — `Vec::sort_by` is a stable sort,
/// so preserving that order going in preserves it coming out.
pub fn reciprocal_rank_fusion(list1: &[ChunkId], list2: &[ChunkId], k: f64) -> Vec<(ChunkId, f64)> {
    let mut scores: HashMap<ChunkId, f64> = HashMap::new();
    let mut order: Vec<ChunkId> = Vec::new();
    let mut seen: HashSet<ChunkId> = HashSet::new();

    for (rank, id) in list1.iter().enumerate() {
        *scores.entry(*id).or_insert(0.0) += 1.0 / (k + rank as f64 + 1.0);
        if seen.insert(*id) {
            order.push(*id);
        }
    }
    for (rank, id) in list2.iter().enumerate() {
        *scores.entry(*id).or_insert(0.0) += 1.0 / (k + rank as f64 + 1.0);
        if seen.insert(*id) {
            order.push(*id);
        }
    }

    let mut merged: Vec<(ChunkId, f64)> = order.into_iter().map(|id| (id, scores[&id])).collect();
    merged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    merged
}
