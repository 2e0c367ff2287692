//! Error taxonomy for the sync orchestrator (§7). Per-document pipeline
//! errors are counted, not fatal (see `document_pipeline::PipelineError`);
//! everything here is fatal to the whole `sync()` call.

use search_connector::RegistryError;
use search_store::StoreError;
use search_traits::{ErrorKind, SourceId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("source {0} not found")]
    SourceNotFound(SourceId),

    #[error("sync already in progress for source {0}")]
    InProgress(SourceId),

    #[error("connector validation failed: {0}")]
    ConnectorValidation(String),

    #[error("connector closed its streams without signalling completion")]
    ConnectorClosed,

    #[error("sync cancelled")]
    Cancelled,

    #[error("connector registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{} source(s) failed to sync", .0.len())]
    Joined(Vec<(SourceId, SyncError)>),

    #[error("{0}")]
    Other(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::SourceNotFound(_) => ErrorKind::NotFound,
            SyncError::InProgress(_) => ErrorKind::SyncInProgress,
            SyncError::ConnectorValidation(_) => ErrorKind::ConnectorValidation,
            SyncError::ConnectorClosed => ErrorKind::ConnectorClosed,
            SyncError::Cancelled => ErrorKind::Cancelled,
            SyncError::Registry(RegistryError::UnknownType(_)) => ErrorKind::NotFound,
            SyncError::Registry(RegistryError::AlreadyRegistered(_)) => ErrorKind::AlreadyExists,
            SyncError::Store(e) => e.kind(),
            SyncError::Joined(_) => ErrorKind::Internal,
            SyncError::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
