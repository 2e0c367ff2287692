//! Root error kind shared across the search core.
//!
//! Every crate owns its own `thiserror` enum for the errors it can actually
//! produce, but each of those enums carries an [`ErrorKind`] so callers at
//! any boundary (CLI, TUI, MCP server) can match on category without
//! downcasting through crate-specific error types.

use thiserror::Error;

/// Category of a core error, independent of which crate raised it.
///
/// Mirrors the taxonomy every component agrees on: pipeline/document errors
/// are counted and non-fatal, validation/cancellation errors are fatal to
/// the operation that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    NotImplemented,
    UnsupportedType,
    SyncInProgress,
    ConnectorValidation,
    ConnectorClosed,
    RateLimited,
    AuthRequired,
    AuthExpired,
    AuthInvalid,
    TokenRefreshFailed,
    AuthProviderInUse,
    LlmUnavailable,
    EmbeddingUnavailable,
    SearchUnavailable,
    VectorIndexUnavailable,
    Cancelled,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotImplemented => "not_implemented",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::SyncInProgress => "sync_in_progress",
            ErrorKind::ConnectorValidation => "connector_validation",
            ErrorKind::ConnectorClosed => "connector_closed",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::AuthRequired => "auth_required",
            ErrorKind::AuthExpired => "auth_expired",
            ErrorKind::AuthInvalid => "auth_invalid",
            ErrorKind::TokenRefreshFailed => "token_refresh_failed",
            ErrorKind::AuthProviderInUse => "auth_provider_in_use",
            ErrorKind::LlmUnavailable => "llm_unavailable",
            ErrorKind::EmbeddingUnavailable => "embedding_unavailable",
            ErrorKind::SearchUnavailable => "search_unavailable",
            ErrorKind::VectorIndexUnavailable => "vector_index_unavailable",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        }
    }

    /// Whether a failure of this kind should abort the whole operation it
    /// occurred within, as opposed to being counted and skipped.
    pub fn is_fatal_to_sync(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectorValidation
                | ErrorKind::ConnectorClosed
                | ErrorKind::Cancelled
                | ErrorKind::SyncInProgress
                | ErrorKind::InvalidInput
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind}: {message}")]
    Typed { kind: ErrorKind, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::Typed {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Typed { kind, .. } => *kind,
            Error::Config(_) => ErrorKind::InvalidInput,
            Error::CapabilityMissing { .. } => ErrorKind::InvalidInput,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
