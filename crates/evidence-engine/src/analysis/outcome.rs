use serde::Serialize;

use super::metrics::MetricsBag;
use crate::conditions::ConditionKey;

/// Result of analyzing one condition against one snapshot.
///
/// `has_data` is false exactly when no entry or measurement matched, and then
/// `supported_rating` is `None` and every list is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub condition: ConditionKey,
    pub code: &'static str,
    pub label: &'static str,
    pub has_data: bool,
    pub supported_rating: Option<u8>,
    /// Tier the gaps point at; `None` at the maximum or without data.
    pub next_rating: Option<u8>,
    pub max_rating: u8,
    pub rating_rationale: Vec<String>,
    pub gaps: Vec<String>,
    pub metrics: MetricsBag,
}

impl AnalysisResult {
    pub(crate) fn without_data(condition: ConditionKey, max_rating: u8) -> Self {
        Self {
            condition,
            code: condition.code(),
            label: condition.label(),
            has_data: false,
            supported_rating: None,
            next_rating: None,
            max_rating,
            rating_rationale: Vec::new(),
            gaps: Vec::new(),
            metrics: MetricsBag::default(),
        }
    }

    pub fn at_max_rating(&self) -> bool {
        self.supported_rating == Some(self.max_rating)
    }
}

/// Analysis outcome as seen by presentation code.
///
/// An unregistered or disabled key is not an error; callers skip rendering it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Supported(AnalysisResult),
    #[serde(rename_all = "camelCase")]
    Unsupported { condition_key: String },
}

impl AnalysisOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Supported(result) => Some(result),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            Self::Supported(result) => Some(result),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}
