//! # Connector registry + factory (§4.1, §9)
//!
//! "Registry + factory" represented as a tagged variant behind a trait
//! object, not runtime reflection: every connector type registers a
//! [`ConnectorFactory`] under its type string at process start, and the
//! orchestrator resolves `Source::source_type` to a factory through this
//! registry rather than switching on the string itself anywhere else.

use std::collections::HashMap;
use std::sync::Arc;

use search_traits::{Connector, Credentials, SourceId};

use crate::error::RegistryError;

/// Everything a factory needs to construct a connector instance for one
/// source, independent of how that source is persisted.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub source_id: SourceId,
    pub source_type: String,
    pub config: HashMap<String, String>,
}

/// Constructs connector instances for one connector type. Implementations
/// live in the crate that owns the concrete connector (this crate for
/// `filesystem`; out-of-scope connector crates for everything else).
pub trait ConnectorFactory: Send + Sync {
    fn connector_type(&self) -> &str;

    fn create(
        &self,
        descriptor: &SourceDescriptor,
        credentials: Option<&Credentials>,
    ) -> Result<Arc<dyn Connector>, RegistryError>;
}

#[derive(Default)]
pub struct ConnectorRegistry {
    factories: HashMap<String, Arc<dyn ConnectorFactory>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Arc<dyn ConnectorFactory>) -> Result<(), RegistryError> {
        let connector_type = factory.connector_type().to_string();
        if self.factories.contains_key(&connector_type) {
            return Err(RegistryError::AlreadyRegistered(connector_type));
        }
        self.factories.insert(connector_type, factory);
        Ok(())
    }

    pub fn create(
        &self,
        descriptor: &SourceDescriptor,
        credentials: Option<&Credentials>,
    ) -> Result<Arc<dyn Connector>, RegistryError> {
        let factory = self
            .factories
            .get(&descriptor.source_type)
            .ok_or_else(|| RegistryError::UnknownType(descriptor.source_type.clone()))?;
        factory.create(descriptor, credentials)
    }

    pub fn is_registered(&self, connector_type: &str) -> bool {
        self.factories.contains_key(connector_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::FilesystemConnectorFactory;

    #[test]
    fn registering_the_same_type_twice_is_rejected() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Arc::new(FilesystemConnectorFactory)).unwrap();
        let err = registry.register(Arc::new(FilesystemConnectorFactory)).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered(_)));
    }

    #[test]
    fn unknown_type_is_not_found() {
        let registry = ConnectorRegistry::new();
        let descriptor = SourceDescriptor {
            source_id: SourceId::new(),
            source_type: "github".to_string(),
            config: HashMap::new(),
        };
        let err = registry.create(&descriptor, None).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownType(_)));
    }

    #[test]
    fn registered_type_constructs_a_connector() {
        let mut registry = ConnectorRegistry::new();
        registry.register(Arc::new(FilesystemConnectorFactory)).unwrap();
        let mut config = HashMap::new();
        config.insert("root_path".to_string(), "/tmp".to_string());
        let descriptor = SourceDescriptor {
            source_id: SourceId::new(),
            source_type: "filesystem".to_string(),
            config,
        };
        assert!(registry.create(&descriptor, None).is_ok());
    }
}
