use search_traits::{ErrorKind, TraitError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::InvalidInput(_) => ErrorKind::InvalidInput,
            IndexError::Database(_) | IndexError::Migration(_) => ErrorKind::Internal,
        }
    }
}

impl From<IndexError> for TraitError {
    fn from(e: IndexError) -> Self {
        let kind = e.kind();
        TraitError::new(kind, e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
