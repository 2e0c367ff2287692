//! Workspace placeholder crate.
//!
//! This crate exists only so the workspace root has something to build;
//! host applications depend on [`search_core`] directly.

pub use search_core::*;
