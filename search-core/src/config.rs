//! # Core configuration
//!
//! The one config struct a host builds before calling
//! [`CoreService::bootstrap`](crate::CoreService::bootstrap): where the
//! document store lives, how logging is configured, how the chunker is
//! sized, and which connector factories ship beyond the built-in
//! filesystem one. Builder pattern with fail-fast `validate()`/`build()`,
//! the same discipline `search_runtime::config::RuntimeConfig` applies one
//! layer down.
//!
//! ```ignore
//! use search_core::{CoreConfig, CoreService, ExternalServices};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CoreConfig::builder()
//!         .database_path("./search.db")
//!         .chunk_size(1000)
//!         .chunk_overlap(100)
//!         .build()?;
//!
//!     let core = CoreService::bootstrap(config, ExternalServices::default()).await?;
//!
//!     // Use the core service...
//!
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use search_connector::ConnectorFactory;
use search_runtime::events::DEFAULT_EVENT_BUFFER_SIZE;
use search_runtime::logging::LoggingConfig;

use crate::error::{CoreError, Result};

/// Default chunk size / overlap (characters) for the fixed-size-with-
/// overlap post-processor (§9 C), used when a caller doesn't override
/// either.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

pub struct CoreConfig {
    pub database_path: PathBuf,
    pub logging: LoggingConfig,
    pub event_bus_capacity: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub extra_connectors: Vec<Arc<dyn ConnectorFactory>>,
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(CoreError::InitializationFailed(
                "database_path must not be empty".to_string(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(CoreError::InitializationFailed(
                "event_bus_capacity must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(CoreError::InitializationFailed(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

pub struct CoreConfigBuilder {
    database_path: PathBuf,
    logging: LoggingConfig,
    event_bus_capacity: usize,
    chunk_size: usize,
    chunk_overlap: usize,
    extra_connectors: Vec<Arc<dyn ConnectorFactory>>,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("search.db"),
            logging: LoggingConfig::default(),
            event_bus_capacity: DEFAULT_EVENT_BUFFER_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            extra_connectors: Vec::new(),
        }
    }
}

impl CoreConfigBuilder {
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

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    /// Registers an additional connector factory beyond the built-in
    /// `filesystem` one. A future GitHub/Google Drive/Dropbox connector
    /// crate (out of scope here, §1) would plug in through this.
    pub fn connector(mut self, factory: Arc<dyn ConnectorFactory>) -> Self {
        self.extra_connectors.push(factory);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        let config = CoreConfig {
            database_path: self.database_path,
            logging: self.logging,
            event_bus_capacity: self.event_bus_capacity,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            extra_connectors: self.extra_connectors,
        };
        config.validate()?;
        Ok(config)
    }
}
