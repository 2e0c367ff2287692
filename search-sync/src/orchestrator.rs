//! # Sync Orchestrator (C7, §4.2)
//!
//! Drives one connector through the per-document pipeline into the store
//! and indexes. Full and incremental modes share the same per-document
//! pipeline and the same `activeSyncs` bookkeeping; they differ only in
//! which pair of streams the connector hands back and how a `Deleted`
//! change is handled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tracing::{instrument, warn};

use search_async::sync::Mutex;
use search_connector::{ConnectorRegistry, SourceDescriptor};
use search_runtime::events::{CoreEvent, EventBus, SyncEvent};
use search_store::repositories::{SourceRepository, SyncStateRepository};
use search_store::{Source, StoreError, SyncState};
use search_traits::connector::{
    BoxStream, ChangeKind, Connector, ConnectorSignal, RawDocument, RawDocumentChange, SyncContext,
};
use search_traits::{SecretStore, SourceId};

use crate::document_pipeline::DocumentPipeline;
use crate::error::{Result, SyncError};

/// Per-source bookkeeping while a sync is in flight. Cheap to clone: the
/// counters are shared `Arc`s, so the orchestrator can hand a copy to the
/// draining task while keeping the original in `active` for `status()`.
#[derive(Clone)]
struct ActiveSync {
    documents_processed: Arc<AtomicU64>,
    error_count: Arc<AtomicU64>,
}

impl ActiveSync {
    fn new() -> Self {
        Self {
            documents_processed: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub running: bool,
    pub documents_processed: u64,
    pub error_count: u64,
}

/// Everything the orchestrator needs, assembled once by `search-core`.
pub struct SyncOrchestrator {
    sources: Arc<dyn SourceRepository>,
    sync_states: Arc<dyn SyncStateRepository>,
    connectors: Arc<ConnectorRegistry>,
    secrets: Option<Arc<dyn SecretStore>>,
    pipeline: Arc<DocumentPipeline>,
    events: Arc<EventBus>,
    active: Mutex<HashMap<SourceId, ActiveSync>>,
}

impl SyncOrchestrator {
    pub fn new(
        sources: Arc<dyn SourceRepository>,
        sync_states: Arc<dyn SyncStateRepository>,
        connectors: Arc<ConnectorRegistry>,
        secrets: Option<Arc<dyn SecretStore>>,
        pipeline: Arc<DocumentPipeline>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            sources,
            sync_states,
            connectors,
            secrets,
            pipeline,
            events,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// `{running, documents_processed, error_count}` for one source. A
    /// source with no sync currently in flight reports `running: false`
    /// and zeroed counters — this is a live snapshot, not a history.
    pub async fn status(&self, source_id: SourceId) -> SyncStatus {
        let active = self.active.lock().await;
        match active.get(&source_id) {
            Some(a) => SyncStatus {
                running: true,
                documents_processed: a.documents_processed.load(Ordering::Relaxed),
                error_count: a.error_count.load(Ordering::Relaxed),
            },
            None => SyncStatus {
                running: false,
                documents_processed: 0,
                error_count: 0,
            },
        }
    }

    /// Syncs every configured source, sequentially (§5 ordering
    /// guarantees). Never short-circuits on a single source's failure;
    /// collects them into `SyncError::Joined`.
    #[instrument(skip(self, ctx))]
    pub async fn sync_all(&self, ctx: &SyncContext) -> Result<()> {
        let sources = self.sources.list().await?;
        let mut errors = Vec::new();
        for source in sources {
            if let Err(e) = self.sync(ctx, source.id).await {
                errors.push((source.id, e));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Joined(errors))
        }
    }

    /// Runs the §4.2 algorithm for one source end to end.
    #[instrument(skip(self, ctx))]
    pub async fn sync(&self, ctx: &SyncContext, source_id: SourceId) -> Result<()> {
        let source = self.sources.get(source_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => SyncError::SourceNotFound(source_id),
            other => SyncError::Store(other),
        })?;

        let credentials = self.resolve_credentials(&source).await?;

        let descriptor = SourceDescriptor {
            source_id,
            source_type: source.source_type.clone(),
            config: source.config.clone(),
        };
        let connector = self.connectors.create(&descriptor, credentials.as_ref())?;

        let result = self.run(ctx, &source, connector.as_ref()).await;

        if let Err(e) = connector.close().await {
            warn!(source_id = %source_id, error = %e, "connector close failed");
        }

        result
    }

    async fn resolve_credentials(
        &self,
        source: &Source,
    ) -> Result<Option<search_traits::Credentials>> {
        match (&self.secrets, source.credentials_id) {
            (Some(secrets), Some(id)) => {
                let creds = secrets
                    .get(id)
                    .await
                    .map_err(|e| SyncError::Other(e.message))?;
                Ok(Some(creds))
            }
            _ => Ok(None),
        }
    }

    async fn run(&self, ctx: &SyncContext, source: &Source, connector: &dyn Connector) -> Result<()> {
        if connector.capabilities().supports_validation {
            connector
                .validate(ctx)
                .await
                .map_err(|e| SyncError::ConnectorValidation(e.message))?;
        }

        let state = self.sync_states.get(source.id).await?;
        let cursor = state.as_ref().map(|s| s.cursor.clone()).unwrap_or_default();

        {
            let mut active = self.active.lock().await;
            if active.contains_key(&source.id) {
                return Err(SyncError::InProgress(source.id));
            }
            active.insert(source.id, ActiveSync::new());
        }

        let outcome = self.drive(ctx, source, connector, &cursor).await;

        self.active.lock().await.remove(&source.id);

        let new_cursor = outcome?;

        self.sync_states
            .upsert(&SyncState {
                source_id: source.id,
                cursor: new_cursor,
                last_sync: Utc::now(),
            })
            .await?;

        Ok(())
    }

    async fn drive(
        &self,
        ctx: &SyncContext,
        source: &Source,
        connector: &dyn Connector,
        cursor: &str,
    ) -> Result<String> {
        let active = {
            let guard = self.active.lock().await;
            guard
                .get(&source.id)
                .cloned()
                .expect("registered by run() before drive() is called")
        };

        let is_incremental = connector.capabilities().supports_incremental && !cursor.is_empty();
        let supports_cursor_return = connector.capabilities().supports_cursor_return;

        self.events
            .emit(CoreEvent::Sync(SyncEvent::Started {
                job_id: source.id.to_string(),
                source_id: source.id.to_string(),
                is_full_sync: !is_incremental,
            }))
            .ok();

        let result = if is_incremental {
            let (changes, signals) = connector
                .incremental_sync(ctx, cursor)
                .await
                .map_err(|e| SyncError::Other(e.message))?;
            self.drain_incremental(ctx, source.id, changes, signals, &active, supports_cursor_return)
                .await
        } else {
            let (docs, signals) = connector
                .full_sync(ctx)
                .await
                .map_err(|e| SyncError::Other(e.message))?;
            self.drain_full(ctx, docs, signals, &active, supports_cursor_return).await
        };

        match &result {
            Ok(_) => {
                self.events
                    .emit(CoreEvent::Sync(SyncEvent::Completed {
                        job_id: source.id.to_string(),
                        items_added: 0,
                        items_updated: 0,
                        items_deleted: 0,
                        items_failed: active.error_count.load(Ordering::Relaxed),
                        duration_secs: 0,
                    }))
                    .ok();
            }
            Err(e) => {
                self.events
                    .emit(CoreEvent::Sync(SyncEvent::Failed {
                        job_id: source.id.to_string(),
                        message: e.to_string(),
                        items_processed: active.documents_processed.load(Ordering::Relaxed),
                    }))
                    .ok();
            }
        }

        result
    }

    async fn drain_full(
        &self,
        ctx: &SyncContext,
        mut docs: BoxStream<RawDocument>,
        mut signals: BoxStream<ConnectorSignal>,
        active: &ActiveSync,
        supports_cursor_return: bool,
    ) -> Result<String> {
        let mut docs_done = false;
        let mut cursor: Option<String> = None;

        loop {
            if docs_done && cursor.is_some() {
                return Ok(cursor.unwrap());
            }

            tokio::select! {
                _ = ctx.cancellation.cancelled() => return Err(SyncError::Cancelled),
                item = docs.next(), if !docs_done => {
                    match item {
                        Some(raw) => match self.pipeline.process(ctx, raw).await {
                            Ok(_) => { active.documents_processed.fetch_add(1, Ordering::Relaxed); }
                            Err(e) => {
                                warn!(error = %e, "per-document pipeline error");
                                active.error_count.fetch_add(1, Ordering::Relaxed);
                            }
                        },
                        None => docs_done = true,
                    }
                }
                item = signals.next(), if cursor.is_none() => {
                    match item {
                        Some(ConnectorSignal::Complete { new_cursor }) => cursor = Some(new_cursor),
                        Some(ConnectorSignal::Error(e)) => {
                            warn!(error = %e, "connector reported an error");
                            active.error_count.fetch_add(1, Ordering::Relaxed);
                        }
                        None => {
                            if supports_cursor_return {
                                return Err(SyncError::ConnectorClosed);
                            }
                            // §4.2 step 8 / Open Question (a): a connector that
                            // doesn't return a cursor falls back to a monotonic
                            // timestamp rather than failing the sync.
                            cursor = Some(search_async::time::now_unix_millis().to_string());
                        }
                    }
                }
            }
        }
    }

    async fn drain_incremental(
        &self,
        ctx: &SyncContext,
        source_id: SourceId,
        mut changes: BoxStream<RawDocumentChange>,
        mut signals: BoxStream<ConnectorSignal>,
        active: &ActiveSync,
        supports_cursor_return: bool,
    ) -> Result<String> {
        let mut changes_done = false;
        let mut cursor: Option<String> = None;

        loop {
            if changes_done && cursor.is_some() {
                return Ok(cursor.unwrap());
            }

            tokio::select! {
                _ = ctx.cancellation.cancelled() => return Err(SyncError::Cancelled),
                item = changes.next(), if !changes_done => {
                    match item {
                        Some(change) => {
                            let outcome = match change.kind {
                                ChangeKind::Deleted => self
                                    .pipeline
                                    .process_deletion(ctx, source_id, &change.document.uri)
                                    .await,
                                ChangeKind::Created | ChangeKind::Updated => {
                                    self.pipeline.process(ctx, change.document).await.map(|_| ())
                                }
                            };
                            match outcome {
                                Ok(_) => { active.documents_processed.fetch_add(1, Ordering::Relaxed); }
                                Err(e) => {
                                    warn!(error = %e, "per-document pipeline error");
                                    active.error_count.fetch_add(1, Ordering::Relaxed);
                                }
                            }
                        }
                        None => changes_done = true,
                    }
                }
                item = signals.next(), if cursor.is_none() => {
                    match item {
                        Some(ConnectorSignal::Complete { new_cursor }) => cursor = Some(new_cursor),
                        Some(ConnectorSignal::Error(e)) => {
                            warn!(error = %e, "connector reported an error");
                            active.error_count.fetch_add(1, Ordering::Relaxed);
                        }
                        None => {
                            if supports_cursor_return {
                                return Err(SyncError::ConnectorClosed);
                            }
                            cursor = Some(search_async::time::now_unix_millis().to_string());
                        }
                    }
                }
            }
        }
    }
}
