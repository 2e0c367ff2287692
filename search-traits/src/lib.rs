//! Trait seams every other `search-*` crate implements or consumes.
//!
//! This crate defines the contracts (§4 of the spec) and nothing else: no
//! concrete connector, index, normaliser or provider lives here. Downstream
//! crates depend on `search-traits` for the vocabulary (`Connector`,
//! `KeywordIndex`, `VectorIndex`, `Normaliser`, `PostProcessor`,
//! `EmbeddingService`, `LlmService`, `SecretStore`) and on the shared ID
//! newtypes, never on each other's concrete types.

pub mod connector;
pub mod error;
pub mod ids;
pub mod index;
pub mod pipeline;
pub mod secret;
pub mod services;

pub use connector::{
    BoxStream, Capabilities, ChangeKind, Connector, ConnectorError, ConnectorSignal, RawDocument,
    RawDocumentChange, SyncContext,
};
pub use error::{ErrorKind, Result, TraitError};
pub use ids::{ChunkId, CredentialsId, DocumentId, ExclusionId, JobId, SourceId, TaskId};
pub use index::{KeywordHit, KeywordIndex, VectorHit, VectorIndex};
pub use pipeline::{ChunkDraft, NormalisedDocument, Normaliser, PostProcessor, ProcessorOptions};
pub use secret::{AuthProvider, Credentials, SecretStore};
pub use services::{EmbeddingService, LlmService};
