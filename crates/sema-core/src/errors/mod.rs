//! Error handling for sema.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod analysis_error;
pub mod config_error;
pub mod embed_error;
pub mod extract_error;
pub mod index_error;
pub mod retrieval_error;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use embed_error::EmbedError;
pub use extract_error::ExtractError;
pub use index_error::IndexError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
