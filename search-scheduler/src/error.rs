//! Error taxonomy for the scheduler (§7). Per-task failures never surface
//! here: they are recorded as a failed `TaskResult` and logged, never
//! propagated out of the run loop (§4.7).

use search_store::StoreError;
use search_traits::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Other(String),
}

impl SchedulerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulerError::Store(e) => e.kind(),
            SchedulerError::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
