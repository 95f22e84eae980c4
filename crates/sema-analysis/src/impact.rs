//! Impact analysis: BFS over caller edges only.
//!
//! Walks CALLS edges backwards from the seed, bounded by depth and edge
//! confidence, and grades the blast radius of a change to it.

use rustc_hash::FxHashSet;
use sema_core::constants::{IMPACT_CONFIDENCE_THRESHOLD, IMPACT_MAX_DEPTH};
use sema_core::errors::AnalysisError;
use sema_storage::Store;

/// Traversal bounds.
#[derive(Debug, Clone)]
pub struct ImpactOptions {
    pub max_depth: u32,
    pub confidence_threshold: f64,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            max_depth: IMPACT_MAX_DEPTH,
            confidence_threshold: IMPACT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// How widely a change to the seed symbol propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// At most 3 transitive dependents.
    Low,
    /// 4–10.
    Medium,
    /// 11–25.
    High,
    /// More than 25.
    Critical,
}

impl RiskLevel {
    pub fn grade(transitive_dependents: usize) -> RiskLevel {
        match transitive_dependents {
            0..=3 => RiskLevel::Low,
            4..=10 => RiskLevel::Medium,
            11..=25 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Data-quality grade of the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactConfidence {
    High,
    /// Partial data: the depth cap truncated traversal, or an edge endpoint
    /// was missing from the store.
    Medium,
    /// Stale data: some visited symbol is newer than the edge that reached
    /// it, so the relationship may no longer hold.
    Degraded,
}

impl ImpactConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactConfidence::High => "high",
            ImpactConfidence::Medium => "medium",
            ImpactConfidence::Degraded => "degraded",
        }
    }
}

/// One discovered dependent.
#[derive(Debug, Clone)]
pub struct Dependent {
    pub symbol_id: String,
    pub qualified_name: String,
    /// Hop distance from the seed (1 = direct caller).
    pub depth: u32,
    /// Call chain from the seed to this dependent, as qualified names.
    pub path: Vec<String>,
}

/// The full report.
#[derive(Debug, Clone)]
pub struct ImpactReport {
    pub symbol_id: String,
    pub qualified_name: String,
    pub direct_dependents: usize,
    pub transitive_dependents: usize,
    pub dependents: Vec<Dependent>,
    pub risk: RiskLevel,
    pub confidence: ImpactConfidence,
}

/// BFS callers-only from `symbol_id`, tracking one discovery path per
/// dependent. A missing seed is an error; everything else degrades the
/// confidence grade instead of failing.
pub fn analyze_impact(
    store: &Store,
    symbol_id: &str,
    branch: &str,
    options: &ImpactOptions,
) -> Result<ImpactReport, AnalysisError> {
    let Some(seed) = store.symbol_by_id(symbol_id, branch)? else {
        return Err(AnalysisError::SymbolNotFound {
            symbol_id: symbol_id.to_string(),
        });
    };

    let mut visited: FxHashSet<String> = FxHashSet::default();
    visited.insert(seed.id.clone());

    let mut dependents: Vec<Dependent> = Vec::new();
    let mut frontier: Vec<(String, Vec<String>)> =
        vec![(seed.id.clone(), vec![seed.qualified_name.clone()])];
    let mut direct_dependents = 0usize;
    let mut stale_data = false;
    let mut missing_endpoint = false;
    let mut truncated_by_depth = false;

    for depth in 1..=options.max_depth {
        let mut next_frontier = Vec::new();

        for (node_id, path) in &frontier {
            let callers = store.callers(node_id, branch)?;
            for edge in callers {
                if edge.confidence < options.confidence_threshold {
                    continue;
                }
                if depth == 1 {
                    direct_dependents += 1;
                }
                if !visited.insert(edge.source_id.clone()) {
                    continue;
                }

                let Some(caller) = store.symbol_by_id(&edge.source_id, branch)? else {
                    missing_endpoint = true;
                    continue;
                };
                if caller.updated_at > edge.updated_at {
                    stale_data = true;
                }

                let mut caller_path = path.clone();
                caller_path.push(caller.qualified_name.clone());
                dependents.push(Dependent {
                    symbol_id: caller.id.clone(),
                    qualified_name: caller.qualified_name.clone(),
                    depth,
                    path: caller_path.clone(),
                });
                next_frontier.push((caller.id, caller_path));
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        if depth == options.max_depth {
            truncated_by_depth = true;
        }
        frontier = next_frontier;
    }

    let transitive_dependents = dependents.len();
    let confidence = if stale_data {
        ImpactConfidence::Degraded
    } else if missing_endpoint || truncated_by_depth {
        ImpactConfidence::Medium
    } else {
        ImpactConfidence::High
    };

    tracing::debug!(
        symbol = %seed.qualified_name,
        direct = direct_dependents,
        transitive = transitive_dependents,
        "impact analysis complete"
    );

    Ok(ImpactReport {
        symbol_id: seed.id,
        qualified_name: seed.qualified_name,
        direct_dependents,
        transitive_dependents,
        risk: RiskLevel::grade(transitive_dependents),
        confidence,
        dependents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_grading_boundaries() {
        assert_eq!(RiskLevel::grade(0), RiskLevel::Low);
        assert_eq!(RiskLevel::grade(3), RiskLevel::Low);
        assert_eq!(RiskLevel::grade(4), RiskLevel::Medium);
        assert_eq!(RiskLevel::grade(10), RiskLevel::Medium);
        assert_eq!(RiskLevel::grade(11), RiskLevel::High);
        assert_eq!(RiskLevel::grade(12), RiskLevel::High);
        assert_eq!(RiskLevel::grade(25), RiskLevel::High);
        assert_eq!(RiskLevel::grade(26), RiskLevel::Critical);
    }
}
