//! # Hybrid Search Engine / Search Service (C8, §4.4)
//!
//! Executes a mode-selected query plan against the keyword and vector
//! indexes, fuses the results with reciprocal rank fusion, hydrates them
//! back into `Document`/`Chunk` pairs, and highlights matching sentences.
//! Neither index nor either of the embedding/LLM services is implemented
//! here — this crate only orchestrates the `search-traits` contracts.

pub mod error;
pub mod fusion;
pub mod highlight;
pub mod service;

pub use error::{Result, SearchError};
pub use fusion::{reciprocal_rank_fusion, RRF_K};
pub use highlight::highlight as highlight_sentences;
pub use service::{SearchOptions, SearchResult, SearchService};
