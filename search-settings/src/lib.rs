//! # Settings & Registries (C10, §4.8)
//!
//! `SettingsService` is the policy layer over the store's singleton
//! `AppSettings` row. `ProviderRegistry`/`ConnectorRegistry` here are
//! read-only metadata catalogs — not to be confused with
//! `search_connector::registry::ConnectorRegistry`, which resolves a
//! `source_type` to a live, constructible connector.

pub mod connector_registry;
pub mod error;
pub mod models;
pub mod provider_registry;
pub mod settings;

pub use connector_registry::{ConnectorInfo, ConnectorRegistry};
pub use error::{Result, SettingsError};
pub use models::{known_embedding_dimensions, ProviderKind};
pub use provider_registry::{AuthCapability, ProviderInfo, ProviderRegistry};
pub use settings::SettingsService;
