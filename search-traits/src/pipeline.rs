//! # Normaliser (C5) and Post-Processor Pipeline (C6) contracts
//!
//! A normaliser turns a `RawDocument` into canonical text + metadata; the
//! post-processor pipeline turns that canonical form into an ordered list
//! of chunks. Neither trait knows about `DocumentId`/`ChunkId` persistence —
//! that's the orchestrator's job once it has these outputs in hand.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::connector::RawDocument;
use crate::error::Result;

/// Output of normalisation: a canonical document body, still unpersisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalisedDocument {
    pub title: String,
    pub content: String,
    pub metadata: HashMap<String, JsonValue>,
}

/// Selected by exact MIME type (§4.3 step 2, §6). Missing ⇒ the orchestrator
/// skips the document with a `NotImplemented` category error.
pub trait Normaliser: Send + Sync {
    /// MIME types this normaliser claims, matched exactly (no wildcards).
    fn supported_mime_types(&self) -> &[&str];

    fn normalise(&self, raw: &RawDocument) -> Result<NormalisedDocument>;
}

/// Per-processor configuration, e.g. `{chunk_size, overlap, max_length,
/// model}` (§6). Stored as a flat string map so the pipeline's
/// configuration can be a plain list of `(name, options)` pairs without the
/// pipeline crate needing to know about every processor's option type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorOptions {
    values: HashMap<String, String>,
}

impl ProcessorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

/// A chunk before it has been assigned a stable ID by the orchestrator.
/// `position` is 0-based and dense within one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub position: u32,
    pub content: String,
}

/// One stage of the post-processor pipeline (§6). A concrete pipeline is an
/// ordered `Vec<Box<dyn PostProcessor>>`; each stage consumes the previous
/// stage's chunks and may split, merge or enrich them.
#[async_trait]
pub trait PostProcessor: Send + Sync {
    fn name(&self) -> &str;

    async fn process(
        &self,
        document: &NormalisedDocument,
        chunks: Vec<ChunkDraft>,
    ) -> Result<Vec<ChunkDraft>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_options_parses_typed_values_with_fallback() {
        let opts = ProcessorOptions::new().with("chunk_size", "512");
        assert_eq!(opts.get_usize("chunk_size", 1000), 512);
        assert_eq!(opts.get_usize("overlap", 50), 50);
    }
}
