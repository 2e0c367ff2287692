//! # Normaliser Registry (C5) and Post-Processor Pipeline (C6)
//!
//! Turns a `RawDocument` into canonical text+metadata (normalisation),
//! then that canonical form into an ordered list of chunks (the
//! post-processor pipeline). Neither stage persists anything; `search-sync`
//! owns that.

pub mod chunker;
pub mod normaliser;
pub mod pipeline;

pub use chunker::FixedSizeOverlapChunker;
pub use normaliser::{MarkdownNormaliser, NormaliserRegistry, PlainTextNormaliser};
pub use pipeline::{derive_chunk_id, PostProcessorPipeline};
