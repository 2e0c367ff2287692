//! Root error type for the composition facade. Every wired subsystem owns
//! its own `thiserror` enum; this one only aggregates them behind `#[from]`
//! so a host (CLI/TUI/MCP) has a single type to match against at its
//! boundary, same shape as the teacher's own `CoreError`.

use thiserror::Error;

use search_traits::ErrorKind;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("store error: {0}")]
    Store(#[from] search_store::StoreError),

    #[error("sync error: {0}")]
    Sync(#[from] search_sync::SyncError),

    #[error("search error: {0}")]
    Search(#[from] search_query::SearchError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] search_scheduler::SchedulerError),

    #[error("settings error: {0}")]
    Settings(#[from] search_settings::SettingsError),

    #[error("connector registry error: {0}")]
    Registry(#[from] search_connector::RegistryError),

    #[error("index error: {0}")]
    Index(#[from] search_index::IndexError),

    #[error("document pipeline error: {0}")]
    Pipeline(#[from] search_sync::PipelineError),
}

impl CoreError {
    /// Category for this error, independent of which subsystem raised it —
    /// the thing a CLI prints a `failed to X` prefix around and a non-zero
    /// exit code for (§7).
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InitializationFailed(_) => ErrorKind::Internal,
            CoreError::CapabilityMissing { .. } => ErrorKind::InvalidInput,
            CoreError::Store(e) => e.kind(),
            CoreError::Sync(e) => e.kind(),
            CoreError::Search(e) => e.kind(),
            CoreError::Scheduler(e) => e.kind(),
            CoreError::Settings(e) => e.kind(),
            CoreError::Registry(e) => match e {
                search_connector::RegistryError::UnknownType(_) => ErrorKind::NotFound,
                search_connector::RegistryError::AlreadyRegistered(_) => ErrorKind::AlreadyExists,
            },
            CoreError::Index(e) => e.kind(),
            CoreError::Pipeline(e) => e.kind,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_kind_passes_through() {
        let err = CoreError::Store(search_store::StoreError::not_found("Document", "abc"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn capability_missing_is_invalid_input() {
        let err = CoreError::CapabilityMissing {
            capability: "embedding".to_string(),
            message: "no provider configured".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
