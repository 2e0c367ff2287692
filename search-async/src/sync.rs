//! Synchronization primitives used across `search-*` crates.
//!
//! Thin re-exports over `tokio::sync` and `tokio_util::sync::CancellationToken`
//! so that only this crate names Tokio's sync module directly.

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Barrier, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard, Semaphore, SemaphorePermit,
};

pub use tokio_util::sync::CancellationToken;
