//! Error taxonomy for the search service (§7). A `Trait` error carries
//! whatever kind the failing index/service reported; `BothArmsFailed` is
//! the only error the hybrid path raises itself, since losing a single arm
//! is a degradation (§4.4), not a failure.

use search_store::StoreError;
use search_traits::{ErrorKind, TraitError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Trait(#[from] TraitError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("search cancelled")]
    Cancelled,

    #[error("both keyword and vector search failed: keyword={keyword}, vector={vector}")]
    BothArmsFailed { keyword: String, vector: String },

    #[error("{0}")]
    Other(String),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::Trait(e) => e.kind,
            SearchError::Store(e) => e.kind(),
            SearchError::Cancelled => ErrorKind::Cancelled,
            SearchError::BothArmsFailed { .. } => ErrorKind::SearchUnavailable,
            SearchError::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
