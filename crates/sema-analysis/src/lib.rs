//! Graph analysis over the stored symbol graph: who depends on a symbol,
//! and what changed between two branches.

pub mod diff;
pub mod impact;

pub use diff::{diff_branches, BranchDiff, DiffOptions, DiffSummary, SymbolChange};
pub use impact::{
    analyze_impact, Dependent, ImpactConfidence, ImpactOptions, ImpactReport, RiskLevel,
};
