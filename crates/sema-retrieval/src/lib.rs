//! Read path of the sema engine.
//!
//! One entry point, `Retriever::search`: vector and keyword retrieval run in
//! parallel, ranks are fused with RRF (scores from the two sources are never
//! compared directly), the top hits are hydrated and expanded through the
//! call graph, and the final set is packed into a token-budgeted context
//! string.

pub mod expansion;
pub mod fusion;
pub mod packing;
pub mod pipeline;
pub mod query;
pub mod similar;

pub use pipeline::Retriever;
pub use query::{QueryMetadata, QueryResult, ResultConfidence, SearchQuery};
pub use similar::{find_similar_at_location, find_similar_by_vector, SimilarResult};
