//! # Filesystem reference connector (§9 C)
//!
//! The one connector this spec requires a working implementation of, since
//! the six end-to-end scenarios (§8) run against it. Walks a local
//! directory tree, emitting one `RawDocument` per file; incremental sync
//! compares a snapshot of `(path, mtime, size)` against the previous
//! cursor so edits and deletions are detected without a filesystem watch
//! API.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use search_traits::connector::{is_hidden_uri, BoxStream};
use search_traits::{
    Capabilities, ChangeKind, Connector, ConnectorError, ConnectorSignal, ErrorKind, RawDocument,
    RawDocumentChange, SourceId, SyncContext,
};

use crate::error::RegistryError;
use crate::registry::{ConnectorFactory, SourceDescriptor};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct FsEntry {
    mtime_millis: i64,
    size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct FsCursor {
    entries: HashMap<String, FsEntry>,
}

/// Files larger than this are emitted metadata-only (`content: None`); the
/// normaliser will reject them with `NotImplemented` per §4.3.
const MAX_INLINE_BYTES: u64 = 10 * 1024 * 1024;

pub struct FilesystemConnector {
    source_id: SourceId,
    root: PathBuf,
}

impl FilesystemConnector {
    pub fn new(source_id: SourceId, root: impl Into<PathBuf>) -> Self {
        Self {
            source_id,
            root: root.into(),
        }
    }

    fn uri_for(&self, path: &Path) -> String {
        format!("file://{}", path.display())
    }

    fn mime_for(path: &Path) -> String {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => "text/markdown".to_string(),
            Some("txt") => "text/plain".to_string(),
            _ => "application/octet-stream".to_string(),
        }
    }

    /// Synchronous directory walk; run inside `spawn_blocking` since std::fs
    /// is blocking and the personal-scale tree sizes this connector targets
    /// don't warrant an async walker.
    fn walk(root: &Path) -> std::io::Result<Vec<(PathBuf, std::fs::Metadata)>> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let metadata = entry.metadata()?;
                if metadata.is_dir() {
                    stack.push(path);
                } else if metadata.is_file() {
                    out.push((path, metadata));
                }
            }
        }
        Ok(out)
    }

    fn snapshot(root: &Path) -> std::io::Result<HashMap<String, FsEntry>> {
        let mut entries = HashMap::new();
        for (path, metadata) in Self::walk(root)? {
            let uri = format!("file://{}", path.display());
            if is_hidden_uri(&uri) {
                continue;
            }
            let mtime_millis = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            entries.insert(
                path.to_string_lossy().into_owned(),
                FsEntry {
                    mtime_millis,
                    size: metadata.len(),
                },
            );
        }
        Ok(entries)
    }

    fn read_document(&self, path_str: &str, entry: &FsEntry) -> RawDocument {
        let path = PathBuf::from(path_str);
        let uri = self.uri_for(&path);
        let content = if entry.size <= MAX_INLINE_BYTES {
            std::fs::read(&path).ok()
        } else {
            None
        };
        RawDocument {
            source_id: self.source_id,
            uri,
            mime_type: Self::mime_for(&path),
            content,
            metadata: HashMap::new(),
            parent_uri: None,
        }
    }
}

#[async_trait]
impl Connector for FilesystemConnector {
    fn r#type(&self) -> &str {
        "filesystem"
    }

    fn source_id(&self) -> SourceId {
        self.source_id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_incremental: true,
            supports_watch: false,
            supports_hierarchy: true,
            supports_binary: true,
            supports_validation: true,
            supports_cursor_return: true,
        }
    }

    #[instrument(skip(self, _ctx))]
    async fn validate(&self, _ctx: &SyncContext) -> Result<(), ConnectorError> {
        if !self.root.exists() {
            return Err(ConnectorError::new(
                ErrorKind::ConnectorValidation,
                format!("root path '{}' does not exist", self.root.display()),
            ));
        }
        if !self.root.is_dir() {
            return Err(ConnectorError::new(
                ErrorKind::ConnectorValidation,
                format!("root path '{}' is not a directory", self.root.display()),
            ));
        }
        Ok(())
    }

    #[instrument(skip(self, _ctx))]
    async fn full_sync(
        &self,
        _ctx: &SyncContext,
    ) -> Result<(BoxStream<RawDocument>, BoxStream<ConnectorSignal>), ConnectorError> {
        let root = self.root.clone();
        let entries = tokio::task::spawn_blocking(move || FilesystemConnector::snapshot(&root))
            .await
            .map_err(|e| ConnectorError::new(ErrorKind::Internal, e.to_string()))?
            .map_err(|e| ConnectorError::new(ErrorKind::ConnectorValidation, e.to_string()))?;

        let docs: Vec<RawDocument> = entries
            .iter()
            .map(|(path, entry)| self.read_document(path, entry))
            .collect();

        let new_cursor = serde_json::to_string(&FsCursor { entries })
            .map_err(|e| ConnectorError::new(ErrorKind::Internal, e.to_string()))?;

        let doc_stream = Box::pin(futures::stream::iter(docs));
        let signal_stream = Box::pin(futures::stream::once(async move {
            ConnectorSignal::Complete { new_cursor }
        }));

        Ok((doc_stream, signal_stream))
    }

    #[instrument(skip(self, _ctx, cursor))]
    async fn incremental_sync(
        &self,
        _ctx: &SyncContext,
        cursor: &str,
    ) -> Result<(BoxStream<RawDocumentChange>, BoxStream<ConnectorSignal>), ConnectorError> {
        let previous: FsCursor = if cursor.is_empty() {
            FsCursor::default()
        } else {
            serde_json::from_str(cursor).map_err(|e| {
                ConnectorError::new(ErrorKind::InvalidInput, format!("invalid cursor: {e}"))
            })?
        };

        let root = self.root.clone();
        let current = tokio::task::spawn_blocking(move || FilesystemConnector::snapshot(&root))
            .await
            .map_err(|e| ConnectorError::new(ErrorKind::Internal, e.to_string()))?
            .map_err(|e| ConnectorError::new(ErrorKind::ConnectorValidation, e.to_string()))?;

        let mut changes = Vec::new();

        for (path, entry) in &current {
            match previous.entries.get(path) {
                None => changes.push(RawDocumentChange {
                    kind: ChangeKind::Created,
                    document: self.read_document(path, entry),
                }),
                Some(prev_entry) if prev_entry != entry => changes.push(RawDocumentChange {
                    kind: ChangeKind::Updated,
                    document: self.read_document(path, entry),
                }),
                Some(_) => {}
            }
        }

        for path in previous.entries.keys() {
            if !current.contains_key(path) {
                let uri = format!("file://{path}");
                changes.push(RawDocumentChange {
                    kind: ChangeKind::Deleted,
                    document: RawDocument {
                        source_id: self.source_id,
                        uri,
                        mime_type: String::new(),
                        content: None,
                        metadata: HashMap::new(),
                        parent_uri: None,
                    },
                });
            }
        }

        let new_cursor = serde_json::to_string(&FsCursor { entries: current })
            .map_err(|e| ConnectorError::new(ErrorKind::Internal, e.to_string()))?;

        let change_stream = Box::pin(futures::stream::iter(changes));
        let signal_stream = Box::pin(futures::stream::once(async move {
            ConnectorSignal::Complete { new_cursor }
        }));

        Ok((change_stream, signal_stream))
    }

    async fn close(&self) -> Result<(), ConnectorError> {
        Ok(())
    }
}

pub struct FilesystemConnectorFactory;

impl ConnectorFactory for FilesystemConnectorFactory {
    fn connector_type(&self) -> &str {
        "filesystem"
    }

    fn create(
        &self,
        descriptor: &SourceDescriptor,
        _credentials: Option<&search_traits::Credentials>,
    ) -> Result<Arc<dyn Connector>, RegistryError> {
        let root = descriptor
            .config
            .get("root_path")
            .cloned()
            .unwrap_or_else(|| ".".to_string());
        Ok(Arc::new(FilesystemConnector::new(descriptor.source_id, root)))
    }
}
