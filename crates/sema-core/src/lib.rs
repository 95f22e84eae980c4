//! Core domain model for the sema code-intelligence engine.
//!
//! Everything the other crates share lives here: the symbol/edge/file data
//! model, canonical identity hashing, per-subsystem error enums, layered
//! configuration, and the traits through which external collaborators
//! (embedder, relationship sources, language adapters) plug in.

pub mod config;
pub mod constants;
pub mod errors;
pub mod identity;
pub mod traits;
pub mod types;

pub use config::SemaConfig;
pub use errors::{
    AnalysisError, ConfigError, EmbedError, ExtractError, IndexError, RetrievalError,
    StorageError,
};
pub use types::{
    Edge, EdgeKind, EdgeOrigin, Extraction, FileRecord, FileStatus, RawEdge, RawSymbol,
    RepoMapEntry, Symbol, SymbolKind,
};
