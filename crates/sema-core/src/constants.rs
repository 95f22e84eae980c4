//! Engine-wide default constants. Each is overridable through `SemaConfig`.

/// Max candidates returned by each retrieval source before fusion.
pub const RETRIEVAL_LIMIT: usize = 20;

/// RRF smoothing constant.
pub const RRF_K: u32 = 60;

/// Multiplier applied to keyword hits whose name equals the query exactly.
pub const EXACT_NAME_BOOST: f64 = 2.0;

/// Default graph expansion depth and its hard ceiling.
pub const GRAPH_DEPTH_DEFAULT: u32 = 2;
pub const GRAPH_DEPTH_MAX: u32 = 3;

/// Per-hop edge fan-out cap during graph expansion.
pub const MAX_FAN_OUT: usize = 10;

/// Minimum edge confidence kept during traversal.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Token budget for the packed context bundle.
pub const MAX_TOKENS: usize = 8_000;

/// A truncated block is only emitted when at least this many tokens remain.
pub const MIN_TRUNCATED_TOKENS: usize = 100;

/// Number of top fused hits seeding graph expansion.
pub const GRAPH_SEED_COUNT: usize = 5;

/// Bounded indexing fan-out.
pub const PARALLELISM: usize = 10;

/// Texts per `embed_batch` call.
pub const EMBEDDING_BATCH_SIZE: usize = 100;

/// Embedder LRU cache capacity.
pub const EMBED_CACHE_CAPACITY: u64 = 1_000;

/// Auto-refresh cooldown and file-count ceiling.
pub const AUTO_REFRESH_COOLDOWN_MS: u64 = 30_000;
pub const AUTO_REFRESH_MAX_FILES: usize = 10_000;

/// Fallback chunker bounds for files without extractable symbols.
pub const MAX_CHUNK_LINES: u32 = 100;
pub const CHUNK_OVERLAP: u32 = 10;

/// Impact analysis defaults.
pub const IMPACT_MAX_DEPTH: u32 = 10;
pub const IMPACT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Sentinel file path for symbols referenced by edges but not defined in
/// the workspace (unresolved import targets, external packages).
pub const EXTERNAL_FILE_PATH: &str = "<external>";
