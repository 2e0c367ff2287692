//! Error taxonomy for settings and registry lookups (§7).

use search_store::StoreError;
use search_traits::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Mode requires a provider that isn't configured (§4.8 invariant).
    #[error("{mode} requires {requirement} to be configured")]
    MissingProvider { mode: &'static str, requirement: &'static str },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("unknown connector type: {0}")]
    UnknownConnectorType(String),

    #[error("provider {provider} is not compatible with connector {connector}")]
    IncompatibleProvider { provider: String, connector: String },

    #[error("live validation failed: {0}")]
    LiveValidationFailed(String),

    #[error("local provider {0} requires a base_url")]
    LocalProviderRequiresBaseUrl(String),
}

impl SettingsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettingsError::Store(e) => e.kind(),
            SettingsError::MissingProvider { .. } => ErrorKind::InvalidInput,
            SettingsError::UnknownProvider(_) => ErrorKind::NotFound,
            SettingsError::UnknownConnectorType(_) => ErrorKind::NotFound,
            SettingsError::IncompatibleProvider { .. } => ErrorKind::InvalidInput,
            SettingsError::LiveValidationFailed(_) => ErrorKind::EmbeddingUnavailable,
            SettingsError::LocalProviderRequiresBaseUrl(_) => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
