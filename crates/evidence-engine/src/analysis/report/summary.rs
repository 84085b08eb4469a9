use serde::Serialize;

use super::views::{ConditionSummaryEntry, EvidenceInsights, EvidenceSummary};
use crate::analysis::{AnalysisResult, ConditionRegistry};
use crate::conditions::ConditionKey;
use crate::observations::{well_formed, EvidenceSnapshot};

/// Bulk analysis over every registered condition, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceReport {
    pub results: Vec<AnalysisResult>,
    pub coverage: ObservationCoverage,
}

impl EvidenceReport {
    pub fn result(&self, key: ConditionKey) -> Option<&AnalysisResult> {
        self.results.iter().find(|result| result.condition == key)
    }

    pub fn summary(&self) -> EvidenceSummary {
        let conditions: Vec<ConditionSummaryEntry> = self
            .results
            .iter()
            .map(|result| ConditionSummaryEntry {
                condition: result.condition,
                label: result.label,
                code: result.code,
                has_data: result.has_data,
                supported_rating: result.supported_rating,
                max_rating: result.max_rating,
                gap_count: result.gaps.len(),
            })
            .collect();

        let with_evidence = conditions.iter().filter(|entry| entry.has_data).count();

        EvidenceSummary {
            without_evidence: conditions.len() - with_evidence,
            with_evidence,
            conditions,
            observations: self.coverage,
        }
    }

    pub fn insights(&self) -> EvidenceInsights {
        super::generate_insights(&self.summary(), &self.results)
    }
}

/// How much of the snapshot the registered modules could use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ObservationCoverage {
    pub total_entries: usize,
    /// Entries without a parsable timestamp or with a missing or out-of-range severity.
    pub malformed_entries: usize,
    /// Well-formed entries that no registered module selects.
    pub unmatched_entries: usize,
    pub total_measurements: usize,
    pub unused_measurements: usize,
}

impl ObservationCoverage {
    pub fn measure(registry: &ConditionRegistry, snapshot: &EvidenceSnapshot<'_>) -> Self {
        let mut coverage = Self {
            total_entries: snapshot.entries.len(),
            total_measurements: snapshot.measurements.len(),
            ..Self::default()
        };

        for entry in snapshot.entries {
            if well_formed(entry).is_none() {
                coverage.malformed_entries += 1;
            } else if !registry
                .modules()
                .any(|module| module.selector.matches(entry))
            {
                coverage.unmatched_entries += 1;
            }
        }

        coverage.unused_measurements = snapshot
            .measurements
            .iter()
            .filter(|measurement| {
                !registry
                    .modules()
                    .any(|module| module.selector.consumes(measurement.reading.kind()))
            })
            .count();

        coverage
    }
}
