//! Generic evaluation kernel: metrics bag, criteria tables, tier selection,
//! rationale and gap rendering, the module registry and the bulk report.

pub mod criteria;
mod evaluator;
pub mod metrics;
mod outcome;
mod rationale;
mod registry;
pub mod report;

#[cfg(test)]
mod tests;

use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::debug;

pub use criteria::{
    ClauseStatus, CriteriaError, CriteriaTable, CriteriaTier, Predicate, Requirement, Threshold,
};
pub use metrics::{MetricValue, MetricsBag};
pub use outcome::{AnalysisOutcome, AnalysisResult};
pub use registry::{Aggregator, ConditionModule, ConditionRegistry, InvalidModule};
pub use report::{EvidenceReport, ObservationCoverage};

use crate::conditions::ConditionKey;
use crate::observations::{EvidenceSnapshot, ObservationEntry};

/// Stateless engine applying the registered criteria tables to snapshots.
#[derive(Debug, Clone, Default)]
pub struct RatingEngine {
    registry: ConditionRegistry,
}

impl RatingEngine {
    pub fn new(registry: ConditionRegistry) -> Self {
        Self { registry }
    }

    pub fn standard() -> Self {
        Self::new(ConditionRegistry::standard())
    }

    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// Analyze one condition, identified by slug or diagnostic code.
    pub fn analyze(&self, condition_key: &str, entries: &[ObservationEntry]) -> AnalysisOutcome {
        self.analyze_snapshot(condition_key, &EvidenceSnapshot::new(entries))
    }

    pub fn analyze_snapshot(
        &self,
        condition_key: &str,
        snapshot: &EvidenceSnapshot<'_>,
    ) -> AnalysisOutcome {
        match condition_key.parse::<ConditionKey>() {
            Ok(key) => self.analyze_key(key, snapshot),
            Err(_) => {
                debug!(condition_key, "unsupported condition requested");
                AnalysisOutcome::Unsupported {
                    condition_key: condition_key.trim().to_string(),
                }
            }
        }
    }

    pub fn analyze_key(&self, key: ConditionKey, snapshot: &EvidenceSnapshot<'_>) -> AnalysisOutcome {
        match self.registry.get(key) {
            Some(module) => AnalysisOutcome::Supported(module.analyze(snapshot)),
            None => {
                debug!(condition = key.slug(), "condition not registered");
                AnalysisOutcome::Unsupported {
                    condition_key: key.slug().to_string(),
                }
            }
        }
    }

    /// Every registered condition, analyzed in parallel and returned in registry order.
    pub fn analyze_all(&self, snapshot: &EvidenceSnapshot<'_>) -> EvidenceReport {
        let modules: Vec<&'static ConditionModule> = self.registry.modules().collect();
        let results: Vec<AnalysisResult> = modules
            .par_iter()
            .map(|module| module.analyze(snapshot))
            .collect();

        let coverage = ObservationCoverage::measure(&self.registry, snapshot);
        debug!(
            conditions = results.len(),
            with_evidence = results.iter().filter(|result| result.has_data).count(),
            "analyzed all registered conditions"
        );

        EvidenceReport { results, coverage }
    }
}

fn standard_engine() -> &'static RatingEngine {
    static ENGINE: OnceLock<RatingEngine> = OnceLock::new();
    ENGINE.get_or_init(RatingEngine::standard)
}

/// Analyze one condition with the standard registry.
pub fn analyze(condition_key: &str, entries: &[ObservationEntry]) -> AnalysisOutcome {
    standard_engine().analyze(condition_key, entries)
}

/// Analyze every standard condition for a full evidence summary.
pub fn analyze_all(snapshot: &EvidenceSnapshot<'_>) -> EvidenceReport {
    standard_engine().analyze_all(snapshot)
}
