//! # Data model (spec §3)
//!
//! Every persistent entity the Document Store owns: `Source`, `SyncState`,
//! `Document`, `Chunk`, `Exclusion`, plus the scheduler's `ScheduledTask`/
//! `TaskResult` and the singleton `AppSettings` row (C9/C10 persistence
//! lives here rather than in their own crates, same as the teacher keeps
//! every persisted entity behind one store regardless of which feature
//! crate owns the behaviour around it).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

use search_traits::{ChunkId, CredentialsId, DocumentId, ExclusionId, JobId, SourceId, TaskId};

/// A configured ingestion endpoint. `config` keys into whatever the
/// connector registered under `source_type` requires (§4.1); the store
/// does not interpret it.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub id: SourceId,
    pub source_type: String,
    pub name: String,
    pub config: HashMap<String, String>,
    pub auth_provider_id: Option<String>,
    pub credentials_id: Option<CredentialsId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Source {
    pub fn new(source_type: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SourceId::new(),
            source_type: source_type.into(),
            name: name.into(),
            config: HashMap::new(),
            auth_provider_id: None,
            credentials_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// At most one per source (§3). An absent row and an empty cursor are
/// equivalent: both mean "next sync is a full sync".
#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    pub source_id: SourceId,
    pub cursor: String,
    pub last_sync: DateTime<Utc>,
}

impl SyncState {
    pub fn is_empty_cursor(&self) -> bool {
        self.cursor.is_empty()
    }
}

/// Persistent, canonical document derived from a `RawDocument` by
/// normalisation. `(source_id, uri)` is unique; `id` is stable across
/// re-syncs of the same pair (§3 invariant).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub source_id: SourceId,
    pub uri: String,
    pub title: String,
    pub content: String,
    pub metadata: HashMap<String, JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An indexable slice of a `Document`, ordered by `position` within it.
/// Deleted when its document is deleted (§3 ownership).
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub content: String,
    pub position: u32,
    pub embedding: Option<Vec<f32>>,
}

/// A tombstone forbidding `(source_id, uri)` from ever being indexed again
/// until explicitly removed (§3, §8 invariant).
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub id: ExclusionId,
    pub source_id: SourceId,
    pub document_id: Option<DocumentId>,
    pub uri: String,
    pub reason: String,
    pub excluded_at: DateTime<Utc>,
}

/// A periodic background job (spec §3, §4.7). `interval` is stored in
/// whole seconds; the scheduler ticks once a minute regardless, so
/// sub-minute intervals are accepted but never fire more often than the
/// tick period.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub name: String,
    pub interval: chrono::Duration,
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl ScheduledTask {
    pub fn new(name: impl Into<String>, interval: chrono::Duration) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            interval,
            enabled: true,
            last_run: None,
            next_run: None,
            last_success: None,
            last_error: None,
        }
    }

    /// A task is due once `next_run` has passed, or it has never run.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.next_run.map(|next| now >= next).unwrap_or(true)
    }
}

/// One completed (or failed) run of a `ScheduledTask` (spec §3). History
/// is pruned to the 100 most recent rows per task (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub id: JobId,
    pub task_id: TaskId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
    pub items_processed: u64,
}

/// Keeps the last 100 `TaskResult` rows per task (spec §3, §4.7).
pub const TASK_RESULT_HISTORY_LIMIT: i64 = 100;

/// The singleton application-settings row (spec §3, §4.8). Provider/LLM
/// configuration is flattened rather than nested, matching the
/// `app_settings` table's flat column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub search_mode: SearchMode,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub vector_index: VectorIndexSettings,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    TextOnly,
    Hybrid,
    LLMAssisted,
    Full,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::TextOnly => "text_only",
            SearchMode::Hybrid => "hybrid",
            SearchMode::LLMAssisted => "llm_assisted",
            SearchMode::Full => "full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text_only" => Some(SearchMode::TextOnly),
            "hybrid" => Some(SearchMode::Hybrid),
            "llm_assisted" => Some(SearchMode::LLMAssisted),
            "full" => Some(SearchMode::Full),
            _ => None,
        }
    }

    pub fn requires_embedding(&self) -> bool {
        matches!(self, SearchMode::Hybrid | SearchMode::Full)
    }

    pub fn requires_llm(&self) -> bool {
        matches!(self, SearchMode::LLMAssisted | SearchMode::Full)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingSettings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmSettings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorIndexSettings {
    pub enabled: bool,
    pub dimensions: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            search_mode: SearchMode::TextOnly,
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            vector_index: VectorIndexSettings::default(),
            updated_at: Utc::now(),
        }
    }
}

/// Raw row shapes as sqlx sees them, before the newtype/JSON conversions
/// above are applied. Kept private to this crate; repositories map
/// `FromRow` output into the public model types.
#[derive(FromRow)]
pub(crate) struct SourceRow {
    pub id: String,
    pub source_type: String,
    pub name: String,
    pub config: String,
    pub auth_provider_id: Option<String>,
    pub credentials_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(FromRow)]
pub(crate) struct SyncStateRow {
    pub source_id: String,
    pub cursor: String,
    pub last_sync: i64,
}

#[derive(FromRow)]
pub(crate) struct DocumentRow {
    pub id: String,
    pub source_id: String,
    pub uri: String,
    pub title: String,
    pub content: String,
    pub metadata: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(FromRow)]
pub(crate) struct ChunkRow {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub position: i64,
    pub embedding: Option<Vec<u8>>,
}

#[derive(FromRow)]
pub(crate) struct ExclusionRow {
    pub id: String,
    pub source_id: String,
    pub document_id: Option<String>,
    pub uri: String,
    pub reason: String,
    pub excluded_at: i64,
}

#[derive(FromRow)]
pub(crate) struct ScheduledTaskRow {
    pub id: String,
    pub name: String,
    pub interval_secs: i64,
    pub enabled: i64,
    pub last_run: Option<i64>,
    pub next_run: Option<i64>,
    pub last_success: Option<i64>,
    pub last_error: Option<String>,
}

#[derive(FromRow)]
pub(crate) struct TaskResultRow {
    pub id: String,
    pub task_id: String,
    pub started_at: i64,
    pub ended_at: i64,
    pub success: i64,
    pub error: Option<String>,
    pub items_processed: i64,
}

#[derive(FromRow)]
pub(crate) struct AppSettingsRow {
    pub search_mode: String,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_base_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub vector_index_enabled: i64,
    pub vector_index_dimensions: i64,
    pub updated_at: i64,
}

pub(crate) fn encode_embedding(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub(crate) fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_round_trips_through_bytes() {
        let v = vec![0.1_f32, -2.5, 3.0, 0.0];
        let bytes = encode_embedding(&v);
        let decoded = decode_embedding(&bytes);
        assert_eq!(v, decoded);
    }

    #[test]
    fn empty_cursor_means_next_sync_is_full() {
        let state = SyncState {
            source_id: SourceId::new(),
            cursor: String::new(),
            last_sync: Utc::now(),
        };
        assert!(state.is_empty_cursor());
    }
}
