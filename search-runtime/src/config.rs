//! # Runtime configuration
//!
//! The one config struct every host (CLI/TUI/MCP) builds before calling
//! into `search-core`: where the document store lives, how logging is
//! configured, and how large the event bus's broadcast buffer is. Builder
//! pattern with fail-fast `validate()`/`build()`, the same discipline the
//! teacher's `CoreConfigBuilder` applies to its own bridge wiring.
//!
//! ```ignore
//! use search_runtime::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::builder()
//!     .database_path("./search.db")
//!     .event_bus_capacity(512)
//!     .build()?;
//! ```

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use crate::logging::LoggingConfig;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub database_path: PathBuf,
    pub logging: LoggingConfig,
    pub event_bus_capacity: usize,
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("database_path must not be empty".to_string()));
        }
        if self.event_bus_capacity == 0 {
            return Err(Error::Config("event_bus_capacity must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfigBuilder {
    database_path: PathBuf,
    logging: LoggingConfig,
    event_bus_capacity: usize,
}

impl Default for RuntimeConfigBuilder {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("search.db"),
            logging: LoggingConfig::default(),
            event_bus_capacity: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl RuntimeConfigBuilder {
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<RuntimeConfig> {
        let config = RuntimeConfig {
            database_path: self.database_path,
            logging: self.logging,
            event_bus_capacity: self.event_bus_capacity,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = RuntimeConfig::builder().build().unwrap();
        assert_eq!(config.database_path, PathBuf::from("search.db"));
        assert_eq!(config.event_bus_capacity, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = RuntimeConfig::builder()
            .database_path("/tmp/my-search.db")
            .event_bus_capacity(64)
            .build()
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/my-search.db"));
        assert_eq!(config.event_bus_capacity, 64);
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let err = RuntimeConfig::builder().database_path("").build().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn zero_event_bus_capacity_fails_validation() {
        let err = RuntimeConfig::builder().event_bus_capacity(0).build().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }
}
