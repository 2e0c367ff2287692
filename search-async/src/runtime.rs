//! Runtime construction for host binaries and integration tests.

use std::future::Future;

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs a future to completion on a fresh current-thread runtime.
///
/// Intended for small CLI entry points and examples; long-running services
/// should build their own multi-threaded `Runtime` via `Builder`.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("search_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}
