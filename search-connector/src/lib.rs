//! # Connector Protocol (C4)
//!
//! The registry/factory that resolves a source's `source_type` string to a
//! concrete [`Connector`](search_traits::Connector) implementation, plus
//! the one connector this crate implements end-to-end: a local filesystem
//! walker used by the spec's reference scenarios. Also carries the
//! calendar-style cursor codec, which no shipped connector here consumes
//! but whose wire format is specified precisely enough to test in
//! isolation.

pub mod calendar_cursor;
pub mod error;
pub mod filesystem;
pub mod registry;

pub use calendar_cursor::{CalendarCursor, CalendarCursorError};
pub use error::RegistryError;
pub use filesystem::{FilesystemConnector, FilesystemConnectorFactory};
pub use registry::{ConnectorFactory, ConnectorRegistry, SourceDescriptor};
