//! # Keyword Index (C2) and Vector Index (C3) — reference implementations
//!
//! Neither index is interpreted by its callers beyond the `KeywordIndex`/
//! `VectorIndex` traits in `search-traits`: this crate just supplies one
//! concrete, personal-scale-adequate implementation of each.

pub mod error;
pub mod keyword;
pub mod vector;

pub use error::{IndexError, Result};
pub use keyword::SqliteKeywordIndex;
pub use vector::InMemoryVectorIndex;
