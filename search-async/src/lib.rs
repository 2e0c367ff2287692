//! Thin async runtime layer shared by every `search-*` crate.
//!
//! Nothing in this crate is clever: it exists so that `search-sync`,
//! `search-query` and `search-scheduler` spell `search_async::task::spawn`
//! instead of reaching for `tokio` directly, which keeps the runtime choice
//! a single-crate decision.
//!
//! # Modules
//!
//! - `task`: spawning and joining
//! - `time`: sleep, interval, timeout
//! - `sync`: channels, locks, cancellation tokens
//! - `runtime`: building a multi-threaded Tokio runtime for host binaries

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
