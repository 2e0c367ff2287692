//! # Repository pattern implementation
//!
//! One repository trait + SQLite implementation per entity (§3): `Source`,
//! `SyncState`, `Document`, `Chunk`, `Exclusion`. All operations return
//! `search_store::Result<T>`; pagination for listing endpoints is available
//! via `Page`/`PageRequest` where a caller needs it.

mod chunk;
mod document;
mod exclusion;
mod pagination;
mod scheduled_task;
mod settings;
mod source;
mod sync_state;

pub use chunk::{ChunkRepository, SqliteChunkRepository};
pub use document::{DocumentRepository, SqliteDocumentRepository};
pub use exclusion::{ExclusionRepository, SqliteExclusionRepository};
pub use pagination::{Page, PageRequest};
pub use scheduled_task::{
    ScheduledTaskRepository, SqliteScheduledTaskRepository, SqliteTaskResultRepository,
    TaskResultRepository,
};
pub use settings::{SettingsRepository, SqliteSettingsRepository};
pub use source::{SourceRepository, SqliteSourceRepository};
pub use sync_state::{SqliteSyncStateRepository, SyncStateRepository};
