/// Phases reported while an indexing run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    Scanning,
    Hashing,
    Embedding,
    Storing,
    Complete,
}

impl IndexPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexPhase::Scanning => "scanning",
            IndexPhase::Hashing => "hashing",
            IndexPhase::Embedding => "embedding",
            IndexPhase::Storing => "storing",
            IndexPhase::Complete => "complete",
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: IndexPhase,
    pub processed: usize,
    pub total: usize,
    /// Non-fatal condition worth surfacing (e.g. discovery failure during
    /// auto-refresh).
    pub warning: Option<String>,
}

/// Callback receiving progress events. The engine never blocks on the sink.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Sink that drops every event; the default when the caller passes none.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}
