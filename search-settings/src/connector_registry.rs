//! # Connector metadata registry (§4.8)
//!
//! Distinct from `search_connector::registry::ConnectorRegistry`, which
//! maps a `source_type` string to a live factory. This one never
//! constructs anything: it answers "which auth providers work with this
//! connector type" and "what config keys does it need", for a settings UI
//! to validate a new source before a sync ever runs.

use std::collections::HashMap;

use crate::error::{Result, SettingsError};

#[derive(Debug, Clone)]
pub struct ConnectorInfo {
    pub connector_type: &'static str,
    pub compatible_providers: Vec<&'static str>,
    pub required_config_keys: Vec<&'static str>,
}

pub struct ConnectorRegistry {
    connectors: HashMap<String, ConnectorInfo>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self { connectors: HashMap::new() }
    }

    /// Pre-populated with the connector types spec.md's URI-scheme
    /// examples name (`file://`, `github://`, `gcal://`, `dropbox://`).
    /// `filesystem` is the only one this workspace actually implements;
    /// the rest describe shapes a future connector crate would register.
    pub fn with_known_connectors() -> Self {
        let mut registry = Self::new();
        registry.register(ConnectorInfo {
            connector_type: "filesystem",
            compatible_providers: vec!["none"],
            required_config_keys: vec!["root_path"],
        });
        registry.register(ConnectorInfo {
            connector_type: "github",
            compatible_providers: vec!["github-pat"],
            required_config_keys: vec!["owner", "repo"],
        });
        registry.register(ConnectorInfo {
            connector_type: "gcal",
            compatible_providers: vec!["google-oauth"],
            required_config_keys: vec!["calendar_id"],
        });
        registry.register(ConnectorInfo {
            connector_type: "dropbox",
            compatible_providers: vec!["dropbox-oauth"],
            required_config_keys: vec!["root_path"],
        });
        registry
    }

    pub fn register(&mut self, info: ConnectorInfo) {
        self.connectors.insert(info.connector_type.to_string(), info);
    }

    pub fn get(&self, connector_type: &str) -> Result<&ConnectorInfo> {
        self.connectors
            .get(connector_type)
            .ok_or_else(|| SettingsError::UnknownConnectorType(connector_type.to_string()))
    }

    pub fn list(&self) -> impl Iterator<Item = &ConnectorInfo> {
        self.connectors.values()
    }

    /// Cross-checks the provider ↔ connector compatibility matrix (§4.8).
    pub fn check_compatible(&self, connector_type: &str, provider_name: &str) -> Result<()> {
        let info = self.get(connector_type)?;
        if info.compatible_providers.contains(&provider_name) {
            Ok(())
        } else {
            Err(SettingsError::IncompatibleProvider {
                provider: provider_name.to_string(),
                connector: connector_type.to_string(),
            })
        }
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::with_known_connectors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filesystem_requires_a_root_path() {
        let registry = ConnectorRegistry::with_known_connectors();
        let info = registry.get("filesystem").unwrap();
        assert_eq!(info.required_config_keys, vec!["root_path"]);
    }

    #[test]
    fn incompatible_provider_is_rejected() {
        let registry = ConnectorRegistry::with_known_connectors();
        let err = registry.check_compatible("gcal", "github-pat").unwrap_err();
        assert!(matches!(err, SettingsError::IncompatibleProvider { .. }));
    }

    #[test]
    fn compatible_provider_passes() {
        let registry = ConnectorRegistry::with_known_connectors();
        registry.check_compatible("gcal", "google-oauth").unwrap();
    }

    #[test]
    fn unknown_connector_type_is_not_found() {
        let registry = ConnectorRegistry::with_known_connectors();
        let err = registry.get("notion").unwrap_err();
        assert!(matches!(err, SettingsError::UnknownConnectorType(_)));
    }
}
