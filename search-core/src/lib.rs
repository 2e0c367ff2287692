//! # Core service
//!
//! The composition root. `CoreService::bootstrap` wires every `search-*`
//! crate in the workspace into a single facade: document store, keyword
//! and (optional) vector indexes, the connector registry, the sync
//! orchestrator, the search service, the scheduler, and the settings
//! layer that policies all of them.
//!
//! A host (CLI, TUI, MCP server) depends on this crate alone and talks to
//! [`CoreService`] rather than to any individual `search-*` crate.
//!
//! ```ignore
//! use search_core::{CoreConfig, CoreService, ExternalServices};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CoreConfig::builder()
//!         .database_path("./search.db")
//!         .build()?;
//!
//!     let core = CoreService::bootstrap(config, ExternalServices::default()).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod service;

pub use config::{CoreConfig, CoreConfigBuilder, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use error::{CoreError, Result};
pub use service::{CoreService, ExternalServices};
