use serde::Serialize;

use super::ObservationCoverage;
use crate::conditions::ConditionKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSummaryEntry {
    pub condition: ConditionKey,
    pub label: &'static str,
    pub code: &'static str,
    pub has_data: bool,
    pub supported_rating: Option<u8>,
    pub max_rating: u8,
    pub gap_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceSummary {
    pub conditions: Vec<ConditionSummaryEntry>,
    pub with_evidence: usize,
    pub without_evidence: usize,
    pub observations: ObservationCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageLevel {
    Complete,
    Partial,
    Sparse,
}

impl CoverageLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::Partial => "Partial",
            Self::Sparse => "Sparse",
        }
    }
}

/// Condition with evidence that is still below its maximum tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusEntry {
    pub condition: ConditionKey,
    pub label: &'static str,
    pub supported_rating: u8,
    pub next_rating: u8,
    pub gap_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceInsights {
    pub coverage_level: CoverageLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_condition: Option<&'static str>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus: Vec<FocusEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_evidence_yet: Vec<&'static str>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
}
