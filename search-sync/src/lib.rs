//! # Sync Orchestrator (C7)
//!
//! Drives a configured source's connector through the per-document
//! pipeline (normalise, chunk, embed, persist, index), tracking a cursor
//! per source so repeated syncs are incremental where the connector
//! supports it (§4.2, §4.3).

pub mod document_pipeline;
pub mod error;
pub mod orchestrator;

pub use document_pipeline::{DocumentOutcome, DocumentPipeline, PipelineError};
pub use error::{Result, SyncError};
pub use orchestrator::{SyncOrchestrator, SyncStatus};
