//! # `CoreService` — composition root
//!
//! Wires every `search-*` crate into the four subsystems spec.md §1
//! describes as "the core": the sync orchestrator, the search service, the
//! connector protocol's registry, and the background scheduler, plus the
//! settings layer that policies all three. A host (CLI/TUI/MCP) depends on
//! this crate alone.
//!
//! Embedding and LLM services are ports this crate never implements
//! concretely (§1 out of scope) — a caller supplies them, if at all,
//! through [`ExternalServices`]. Their absence degrades search mode
//! gracefully (§4.4) rather than failing bootstrap.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use search_connector::{ConnectorRegistry, FilesystemConnectorFactory};
use search_index::{InMemoryVectorIndex, SqliteKeywordIndex};
use search_pipeline::{FixedSizeOverlapChunker, NormaliserRegistry, PostProcessorPipeline};
use search_query::{SearchOptions, SearchResult, SearchService};
use search_runtime::events::EventBus;
use search_runtime::logging::init_logging;
use search_scheduler::{Scheduler, SchedulerStatus, TaskHandler};
use search_settings::SettingsService;
use search_store::repositories::{
    ChunkRepository, DocumentRepository, ExclusionRepository, ScheduledTaskRepository,
    SourceRepository, SqliteChunkRepository, SqliteDocumentRepository,
    SqliteExclusionRepository, SqliteScheduledTaskRepository, SqliteSettingsRepository,
    SqliteSourceRepository, SqliteSyncStateRepository, SqliteTaskResultRepository,
    SyncStateRepository, TaskResultRepository,
};
use search_store::{AppSettings, DatabaseConfig, Document, Exclusion, Source};
use search_sync::document_pipeline::DocumentPipeline;
use search_sync::{SyncOrchestrator, SyncStatus};
use search_traits::connector::SyncContext;
use search_traits::{EmbeddingService, LlmService, SecretStore, SourceId};

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};

/// Optional providers a host may supply beyond the reference
/// implementations this workspace ships (§1: embedding/LLM providers,
/// OAuth credential resolution are all external collaborators).
#[derive(Default, Clone)]
pub struct ExternalServices {
    pub embedding: Option<Arc<dyn EmbeddingService>>,
    pub llm: Option<Arc<dyn LlmService>>,
    pub secrets: Option<Arc<dyn SecretStore>>,
}

/// One handler per scheduled task (§9 redesign flag: no central switch on
/// task id). This is the only handler the core ships: document sync,
/// §2's "primarily document sync" for C9. A host registers its own
/// handlers for any other scheduled task by constructing a [`Scheduler`]
/// directly instead of going through `bootstrap`.
struct DocumentSyncHandler {
    orchestrator: Arc<SyncOrchestrator>,
}

#[async_trait]
impl TaskHandler for DocumentSyncHandler {
    async fn run(&self, ctx: &SyncContext) -> std::result::Result<u64, String> {
        self.orchestrator
            .sync_all(ctx)
            .await
            .map_err(|e| e.to_string())?;
        Ok(0)
    }
}

/// Main API façade for the search core. Orchestrates every domain module
/// (store, indexes, pipeline, connectors, orchestrator, search, scheduler,
/// settings) and provides a unified, ergonomic entry point.
pub struct CoreService {
    pub orchestrator: Arc<SyncOrchestrator>,
    pub search: Arc<SearchService>,
    pub scheduler: Arc<Scheduler>,
    pub settings: Arc<SettingsService>,
    pub connectors: Arc<ConnectorRegistry>,
    pub events: Arc<EventBus>,

    sources: Arc<dyn SourceRepository>,
    documents: Arc<dyn DocumentRepository>,
    exclusions: Arc<dyn ExclusionRepository>,
    pipeline: Arc<DocumentPipeline>,
}

impl CoreService {
    /// Brings up every subsystem in dependency order (§2's component
    /// table): pool → repositories → indexes → pipeline → orchestrator /
    /// search service / scheduler / settings.
    #[instrument(skip(config, services))]
    pub async fn bootstrap(config: CoreConfig, services: ExternalServices) -> Result<Self> {
        if let Err(e) = init_logging(config.logging.clone()) {
            // A second `bootstrap` in the same process (common in test
            // harnesses) re-initialising the global subscriber is not a
            // reason to fail; only the first caller's configuration wins.
            warn!(error = %e, "logging already initialised, keeping the existing subscriber");
        }

        let events = Arc::new(EventBus::new(config.event_bus_capacity));

        let db_config = if config.database_path.as_os_str() == "sqlite::memory:" {
            DatabaseConfig::in_memory()
        } else {
            DatabaseConfig::new(&config.database_path)
        };
        let database_url = db_config.database_url.clone();
        let pool = search_store::create_pool(db_config)
            .await
            .map_err(CoreError::Store)?;

        let sources: Arc<dyn SourceRepository> = Arc::new(SqliteSourceRepository::new(pool.clone()));
        let sync_states: Arc<dyn SyncStateRepository> =
            Arc::new(SqliteSyncStateRepository::new(pool.clone()));
        let documents: Arc<dyn DocumentRepository> =
            Arc::new(SqliteDocumentRepository::new(pool.clone()));
        let chunks: Arc<dyn ChunkRepository> = Arc::new(SqliteChunkRepository::new(pool.clone()));
        let exclusions: Arc<dyn ExclusionRepository> =
            Arc::new(SqliteExclusionRepository::new(pool.clone()));
        let scheduled_tasks: Arc<dyn ScheduledTaskRepository> =
            Arc::new(SqliteScheduledTaskRepository::new(pool.clone()));
        let task_results: Arc<dyn TaskResultRepository> =
            Arc::new(SqliteTaskResultRepository::new(pool.clone()));
        let settings_repo = Arc::new(SqliteSettingsRepository::new(pool.clone()));

        let settings_service = Arc::new(SettingsService::new(settings_repo, events.clone()));
        let app_settings = settings_service.get().await.map_err(CoreError::Settings)?;

        let keyword_index = Arc::new(
            SqliteKeywordIndex::open(&database_url)
                .await
                .map_err(CoreError::Index)?,
        );

        let vector_index = if app_settings.vector_index.enabled && app_settings.vector_index.dimensions > 0 {
            Some(Arc::new(InMemoryVectorIndex::new(
                app_settings.vector_index.dimensions as usize,
            )))
        } else {
            None
        };

        let mut registry = ConnectorRegistry::new();
        registry
            .register(Arc::new(FilesystemConnectorFactory))
            .map_err(CoreError::Registry)?;
        for factory in config.extra_connectors {
            registry.register(factory).map_err(CoreError::Registry)?;
        }
        let connectors = Arc::new(registry);

        let pipeline = Arc::new(DocumentPipeline {
            exclusions: exclusions.clone(),
            normalisers: Arc::new(NormaliserRegistry::with_defaults()),
            chunker: Arc::new(PostProcessorPipeline::new(vec![Box::new(
                FixedSizeOverlapChunker::new(config.chunk_size, config.chunk_overlap),
            )])),
            documents: documents.clone(),
            chunks: chunks.clone(),
            keyword_index: keyword_index.clone(),
            vector_index: vector_index
                .clone()
                .map(|v| v as Arc<dyn search_traits::VectorIndex>),
            embedding: services.embedding.clone(),
        });

        let orchestrator = Arc::new(SyncOrchestrator::new(
            sources.clone(),
            sync_states,
            connectors.clone(),
            services.secrets.clone(),
            pipeline.clone(),
            events.clone(),
        ));

        let search = Arc::new(SearchService::new(
            keyword_index,
            vector_index.map(|v| v as Arc<dyn search_traits::VectorIndex>),
            services.embedding,
            services.llm,
            documents.clone(),
            chunks,
            sources.clone(),
            events.clone(),
        ));

        let mut handlers: std::collections::HashMap<String, Arc<dyn TaskHandler>> =
            std::collections::HashMap::new();
        handlers.insert(
            "document_sync".to_string(),
            Arc::new(DocumentSyncHandler {
                orchestrator: orchestrator.clone(),
            }),
        );
        let scheduler = Arc::new(Scheduler::new(
            scheduled_tasks,
            task_results,
            handlers,
            events.clone(),
        ));

        Ok(Self {
            orchestrator,
            search,
            scheduler,
            settings: settings_service,
            connectors,
            events,
            sources,
            documents,
            exclusions,
            pipeline,
        })
    }

    // -- Source management (thin pass-through; the orchestrator and
    // connector registry are the interesting logic) --

    pub async fn add_source(&self, source: &Source) -> Result<()> {
        Ok(self.sources.create(source).await?)
    }

    pub async fn get_source(&self, id: SourceId) -> Result<Source> {
        Ok(self.sources.get(id).await?)
    }

    pub async fn list_sources(&self) -> Result<Vec<Source>> {
        Ok(self.sources.list().await?)
    }

    pub async fn remove_source(&self, id: SourceId) -> Result<()> {
        Ok(self.sources.delete(id).await?)
    }

    // -- Sync (§4.2) --

    pub async fn sync(&self, ctx: &SyncContext, source_id: SourceId) -> Result<()> {
        Ok(self.orchestrator.sync(ctx, source_id).await?)
    }

    pub async fn sync_all(&self, ctx: &SyncContext) -> Result<()> {
        Ok(self.orchestrator.sync_all(ctx).await?)
    }

    pub async fn sync_status(&self, source_id: SourceId) -> SyncStatus {
        self.orchestrator.status(source_id).await
    }

    // -- Documents / exclusions (§3, §4.3 step 1) --

    pub async fn get_document(&self, id: search_traits::DocumentId) -> Result<Document> {
        Ok(self.documents.get(id).await?)
    }

    pub async fn list_documents(&self, source_id: SourceId) -> Result<Vec<Document>> {
        Ok(self.documents.list_by_source(source_id).await?)
    }

    /// Writes the exclusion tombstone, then removes the `Document` it
    /// names (cascading to its `Chunk`s and de-indexing them) so that
    /// `get_document` returns `NotFound` and `list_by_source` omits it
    /// immediately afterwards (§8: "After `exclude(doc_id)`, `get(doc_id)`
    /// returns `NotFound` and `list_by_source` omits it"). A `uri` with no
    /// matching document (nothing ever synced it) leaves the tombstone in
    /// place with no deletion to perform.
    pub async fn exclude_document(
        &self,
        ctx: &SyncContext,
        source_id: SourceId,
        document_id: Option<search_traits::DocumentId>,
        uri: &str,
        reason: &str,
    ) -> Result<Exclusion> {
        let exclusion = self.exclusions.exclude(source_id, document_id, uri, reason).await?;
        self.pipeline.process_deletion(ctx, source_id, uri).await?;
        Ok(exclusion)
    }

    // -- Search (§4.4) --

    pub async fn search(
        &self,
        ctx: &SyncContext,
        query: &str,
        opts: SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        Ok(self.search.search(ctx, query, opts).await?)
    }

    // -- Settings (§4.8) --

    pub async fn settings(&self) -> Result<AppSettings> {
        Ok(self.settings.get().await?)
    }

    // -- Scheduler (§4.7) --

    pub async fn start_scheduler(&self, ctx: &SyncContext) -> Result<()> {
        Ok(self.scheduler.start(ctx).await?)
    }

    pub async fn stop_scheduler(&self) {
        self.scheduler.stop().await;
    }

    pub async fn scheduler_status(&self) -> SchedulerStatus {
        self.scheduler.status().await
    }
}
