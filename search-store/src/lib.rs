//! # Document Store (C1)
//!
//! Persists `Source`, `SyncState`, `Document`, `Chunk` and `Exclusion`
//! (spec §3) over SQLite. This crate owns the canonical data; the keyword
//! and vector indexes (`search-index`) hold derived, best-effort-consistent
//! projections of the same chunks and tolerate staleness on their own.

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{Result, StoreError};
pub use models::{
    AppSettings, Chunk, Document, EmbeddingSettings, Exclusion, LlmSettings, ScheduledTask,
    SearchMode, Source, SyncState, TaskResult, VectorIndexSettings,
};
