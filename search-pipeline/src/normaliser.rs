//! # Normaliser Registry (C5)
//!
//! Selected by exact MIME type (§4.3 step 2, §6). A missing normaliser is
//! not an error at this layer — the orchestrator turns `None` into a
//! counted, non-fatal `NotImplemented` per document.

use std::collections::HashMap;
use std::sync::Arc;

use search_traits::connector::RawDocument;
use search_traits::pipeline::{NormalisedDocument, Normaliser};
use search_traits::{ErrorKind, Result, TraitError};

pub struct NormaliserRegistry {
    by_mime: HashMap<String, Arc<dyn Normaliser>>,
}

impl NormaliserRegistry {
    pub fn new() -> Self {
        Self {
            by_mime: HashMap::new(),
        }
    }

    /// The registry this crate ships configured with, covering the two
    /// MIME types the spec requires a working normaliser for (§9 C).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlainTextNormaliser));
        registry.register(Arc::new(MarkdownNormaliser));
        registry
    }

    pub fn register(&mut self, normaliser: Arc<dyn Normaliser>) {
        for mime in normaliser.supported_mime_types() {
            self.by_mime.insert((*mime).to_string(), normaliser.clone());
        }
    }

    pub fn get(&self, mime_type: &str) -> Option<&dyn Normaliser> {
        self.by_mime.get(mime_type).map(|n| n.as_ref())
    }

    /// Normalises `raw`, or a typed `NotImplemented` error if no normaliser
    /// is registered for its MIME type.
    pub fn normalise(&self, raw: &RawDocument) -> Result<NormalisedDocument> {
        match self.get(&raw.mime_type) {
            Some(normaliser) => normaliser.normalise(raw),
            None => Err(TraitError::new(
                ErrorKind::NotImplemented,
                format!("no normaliser registered for mime type '{}'", raw.mime_type),
            )),
        }
    }
}

impl Default for NormaliserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// `text/plain`: passthrough content, title from the first non-empty line.
pub struct PlainTextNormaliser;

impl Normaliser for PlainTextNormaliser {
    fn supported_mime_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn normalise(&self, raw: &RawDocument) -> Result<NormalisedDocument> {
        let content = decode_utf8_lossy(raw)?;
        let title = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .unwrap_or(&raw.uri)
            .trim()
            .to_string();
        Ok(NormalisedDocument {
            title,
            content,
            metadata: raw.metadata.clone(),
        })
    }
}

/// `text/markdown`: passthrough content (front-matter stripping is out of
/// scope, §9 C), title from the first ATX heading or else the first line.
pub struct MarkdownNormaliser;

impl Normaliser for MarkdownNormaliser {
    fn supported_mime_types(&self) -> &[&str] {
        &["text/markdown"]
    }

    fn normalise(&self, raw: &RawDocument) -> Result<NormalisedDocument> {
        let content = decode_utf8_lossy(raw)?;
        let title = content
            .lines()
            .find_map(|l| l.trim().strip_prefix('#').map(|h| h.trim_start_matches('#').trim().to_string()))
            .or_else(|| content.lines().find(|l| !l.trim().is_empty()).map(|l| l.trim().to_string()))
            .unwrap_or_else(|| raw.uri.clone());
        Ok(NormalisedDocument {
            title,
            content,
            metadata: raw.metadata.clone(),
        })
    }
}

fn decode_utf8_lossy(raw: &RawDocument) -> Result<String> {
    let bytes = raw.content.as_ref().ok_or_else(|| {
        TraitError::new(
            ErrorKind::NotImplemented,
            format!("'{}' has no body to normalise (metadata-only item)", raw.uri),
        )
    })?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
