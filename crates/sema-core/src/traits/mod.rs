//! Contracts consumed by the engine. Implementations live outside the core.

pub mod adapter;
pub mod embedder;
pub mod progress;
pub mod relationship;

pub use adapter::LanguageAdapter;
pub use embedder::Embedder;
pub use progress::{IndexPhase, NullProgress, ProgressEvent, ProgressSink};
pub use relationship::RelationshipSource;
