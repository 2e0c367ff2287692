//! Shared error vocabulary. Every crate in the workspace owns its own
//! `thiserror` enum for the errors it can actually raise, but each variant
//! carries one of these kinds so a caller at any boundary can match on
//! category without downcasting through a crate-specific type.

use thiserror::Error;

/// Category of a core error, independent of which crate raised it.
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

    /// Per-document pipeline errors of this kind are counted and the sync
    /// continues; everything else aborts the sync.
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

/// Minimal error type for the trait crate itself (default-method failures,
/// e.g. an unimplemented `watch()`). Downstream crates define their own
/// richer error enums and convert into/out of `ErrorKind`.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct TraitError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TraitError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TraitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds_match_spec_propagation_policy() {
        assert!(ErrorKind::ConnectorValidation.is_fatal_to_sync());
        assert!(ErrorKind::Cancelled.is_fatal_to_sync());
        assert!(!ErrorKind::NotImplemented.is_fatal_to_sync());
        assert!(!ErrorKind::VectorIndexUnavailable.is_fatal_to_sync());
    }
}
