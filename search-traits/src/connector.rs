//! # Connector Protocol (C4)
//!
//! The sole extension point of the system: every data source (local
//! filesystem, GitHub, Google Drive, Gmail, Calendar, Dropbox, ...) is
//! adapted by a type implementing [`Connector`]. The orchestrator only ever
//! talks to this trait; it never special-cases a connector by type.
//!
//! ## Two-channel streaming
//!
//! `full_sync`/`incremental_sync` return a pair of streams: one of items
//! (`RawDocument` or `RawDocumentChange`), one of [`ConnectorSignal`]. The
//! signal stream carries ordinary errors *and* the terminal
//! [`ConnectorSignal::Complete`] value that marks successful completion and
//! carries the cursor to resume from next time. This is the typed
//! replacement for a transport that originally probed error values for a
//! magic "sync complete" marker: the sum type makes the two cases
//! unconfusable at the type level while preserving the "two channels, one
//! of them dual-purpose" shape.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

use futures::stream::Stream;

use crate::error::{ErrorKind, TraitError};
use crate::ids::SourceId;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// A document as emitted by a connector, before normalisation.
///
/// `content` may be absent for metadata-only items (e.g. a binary file
/// beyond the connector's size threshold); the pipeline treats an absent
/// body as "normalise from metadata alone", which most normalisers will
/// reject with `NotImplemented`.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source_id: SourceId,
    pub uri: String,
    pub mime_type: String,
    pub content: Option<Vec<u8>>,
    pub metadata: HashMap<String, JsonValue>,
    pub parent_uri: Option<String>,
}

impl RawDocument {
    /// The hidden-path rule: any path segment starting with `.` excludes
    /// the item from being emitted as a Document, regardless of connector.
    pub fn is_hidden_path(&self) -> bool {
        is_hidden_uri(&self.uri)
    }
}

/// True if any path segment of `uri` (the part after the scheme, if any)
/// starts with a dot, per the hidden-path rule in the connector contract.
pub fn is_hidden_uri(uri: &str) -> bool {
    let path = uri.split("://").last().unwrap_or(uri);
    path.split('/').any(|segment| segment.starts_with('.') && !segment.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A single incremental-sync change. For `Deleted`, only `source_id` + `uri`
/// on the embedded document need be populated.
#[derive(Debug, Clone)]
pub struct RawDocumentChange {
    pub kind: ChangeKind,
    pub document: RawDocument,
}

/// Terminal value on a connector's signal stream: either an ordinary error
/// (observed and counted by the orchestrator) or successful completion
/// carrying the next cursor.
#[derive(Debug, Clone)]
pub enum ConnectorSignal {
    Complete { new_cursor: String },
    Error(ConnectorError),
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct ConnectorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ConnectorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ConnectorError> for TraitError {
    fn from(e: ConnectorError) -> Self {
        TraitError::new(e.kind, e.message)
    }
}

/// What a connector implementation supports; the orchestrator consults
/// this before choosing full vs. incremental sync and before attempting
/// `watch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub supports_incremental: bool,
    pub supports_watch: bool,
    pub supports_hierarchy: bool,
    pub supports_binary: bool,
    pub supports_validation: bool,
    pub supports_cursor_return: bool,
}

/// Execution context threaded through every connector call: cancellation
/// and an optional deadline inherited from the sync that owns it.
#[derive(Clone)]
pub struct SyncContext {
    pub cancellation: tokio_util::sync::CancellationToken,
}

impl SyncContext {
    pub fn new(cancellation: tokio_util::sync::CancellationToken) -> Self {
        Self { cancellation }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// The connector contract (§4.1). Every source adapter implements this;
/// the orchestrator is the only caller.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The connector type string this instance was constructed for, e.g.
    /// `"filesystem"`, `"github"`. Keys into the connector registry.
    fn r#type(&self) -> &str;

    /// The configured source this connector instance serves.
    fn source_id(&self) -> SourceId;

    fn capabilities(&self) -> Capabilities;

    /// Checks auth, configuration and reachability. Only called when
    /// `capabilities().supports_validation`.
    async fn validate(&self, ctx: &SyncContext) -> Result<(), ConnectorError>;

    /// Emits every document currently visible to the connector. Both
    /// streams close when the sync terminates, successfully or not.
    async fn full_sync(
        &self,
        ctx: &SyncContext,
    ) -> Result<(BoxStream<RawDocument>, BoxStream<ConnectorSignal>), ConnectorError>;

    /// Emits changes since `cursor`. Only called when
    /// `capabilities().supports_incremental`.
    async fn incremental_sync(
        &self,
        ctx: &SyncContext,
        cursor: &str,
    ) -> Result<(BoxStream<RawDocumentChange>, BoxStream<ConnectorSignal>), ConnectorError>;

    /// Long-running change stream for UIs that want live updates. Optional;
    /// the default implementation reports `NotImplemented`.
    async fn watch(&self, _ctx: &SyncContext) -> Result<BoxStream<RawDocumentChange>, ConnectorError> {
        Err(ConnectorError::new(
            ErrorKind::NotImplemented,
            "this connector does not support watch",
        ))
    }

    /// Idempotent teardown. Safe to call multiple times or after a failed
    /// sync.
    async fn close(&self) -> Result<(), ConnectorError>;
}
