use search_traits::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("{entity_type} with id {id} not found")]
    NotFound { entity_type: String, id: String },

    #[error("invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::InvalidInput { .. } => ErrorKind::InvalidInput,
            StoreError::Database(_) | StoreError::Migration(_) | StoreError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
