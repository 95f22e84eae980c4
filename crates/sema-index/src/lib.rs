//! Write path of the sema engine: workspace discovery, Merkle change
//! detection, embedding, and the index manager that orchestrates them.

pub mod embed_cache;
pub mod manager;
pub mod merkle;
pub mod walker;

pub use embed_cache::CachingEmbedder;
pub use manager::{IndexManager, IndexStatus, UpdateSummary};
pub use merkle::{ChangeSet, MerkleCache};
pub use walker::{discover_files, DiscoveredFile};
