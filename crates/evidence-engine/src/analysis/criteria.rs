use serde::Serialize;

use super::metrics::{format_number, MetricValue, MetricsBag};

/// Comparison a single metric must pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Threshold {
    AtLeast(f64),
    AtMost(f64),
    Above(f64),
    Below(f64),
    IsTrue,
    OneOf(&'static [&'static str]),
}

impl Threshold {
    pub fn describe(&self) -> String {
        match self {
            Self::AtLeast(limit) => format!("at least {}", format_number(*limit)),
            Self::AtMost(limit) => format!("at most {}", format_number(*limit)),
            Self::Above(limit) => format!("above {}", format_number(*limit)),
            Self::Below(limit) => format!("below {}", format_number(*limit)),
            Self::IsTrue => "documented".to_string(),
            Self::OneOf(options) => format!("one of {}", options.join(", ")),
        }
    }
}

/// Outcome of checking one requirement against a metrics bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseStatus {
    Met,
    Unmet,
    /// The metric was never computed or nobody answered the question.
    Unreported,
}

/// One clause of a tier predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Requirement {
    pub metric: &'static str,
    pub threshold: Threshold,
    /// Noun phrase used when rendering rationale and gaps.
    pub evidence: &'static str,
}

impl Requirement {
    pub fn check(&self, bag: &MetricsBag) -> ClauseStatus {
        let value = match bag.get(self.metric) {
            None | Some(MetricValue::Unreported) => return ClauseStatus::Unreported,
            Some(value) => value,
        };

        let met = match (self.threshold, value) {
            (Threshold::IsTrue, MetricValue::Flag(flag)) => *flag,
            (Threshold::IsTrue, other) => other.as_number().map_or(false, |value| value > 0.0),
            (Threshold::OneOf(options), MetricValue::Category(category)) => {
                options.contains(&category.as_str())
            }
            (Threshold::OneOf(_), _) => false,
            (Threshold::AtLeast(limit), other) => compare(other, |value| value >= limit),
            (Threshold::AtMost(limit), other) => compare(other, |value| value <= limit),
            (Threshold::Above(limit), other) => compare(other, |value| value > limit),
            (Threshold::Below(limit), other) => compare(other, |value| value < limit),
        };

        if met {
            ClauseStatus::Met
        } else {
            ClauseStatus::Unmet
        }
    }
}

fn compare(value: &MetricValue, test: impl Fn(f64) -> bool) -> bool {
    value.as_number().map_or(false, test)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "requirements", rename_all = "snake_case")]
pub enum Predicate {
    /// Floor tier, satisfied by any evidence at all.
    Always,
    All(&'static [Requirement]),
    Any(&'static [Requirement]),
}

impl Predicate {
    pub fn holds(&self, bag: &MetricsBag) -> bool {
        match self {
            Self::Always => true,
            Self::All(requirements) => requirements
                .iter()
                .all(|requirement| requirement.check(bag) == ClauseStatus::Met),
            Self::Any(requirements) => requirements
                .iter()
                .any(|requirement| requirement.check(bag) == ClauseStatus::Met),
        }
    }

    pub fn requirements(&self) -> &'static [Requirement] {
        match self {
            Self::Always => &[],
            Self::All(requirements) | Self::Any(requirements) => requirements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriteriaTier {
    pub percent: u8,
    pub predicate: Predicate,
    pub summary: &'static str,
}

/// Ordered rating tiers for one condition.
///
/// The lowest tier is a separate field so a table can never be empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriteriaTable {
    pub lowest: CriteriaTier,
    pub higher: &'static [CriteriaTier],
}

impl CriteriaTable {
    /// Tiers in ascending percent order.
    pub fn tiers(&self) -> impl DoubleEndedIterator<Item = &CriteriaTier> + '_ {
        std::iter::once(&self.lowest).chain(self.higher.iter())
    }

    pub fn percents(&self) -> Vec<u8> {
        self.tiers().map(|tier| tier.percent).collect()
    }

    pub fn max_percent(&self) -> u8 {
        self.higher
            .last()
            .map_or(self.lowest.percent, |tier| tier.percent)
    }

    /// First tier whose percent is strictly greater than `percent`.
    pub fn next_above(&self, percent: u8) -> Option<&CriteriaTier> {
        self.tiers().find(|tier| tier.percent > percent)
    }

    pub fn validate(&self, known_metrics: &[&str]) -> Result<(), CriteriaError> {
        let mut previous: Option<u8> = None;

        for (index, tier) in self.tiers().enumerate() {
            if let Some(previous) = previous {
                if tier.percent <= previous {
                    return Err(CriteriaError::UnorderedTiers {
                        previous,
                        next: tier.percent,
                    });
                }
            }
            previous = Some(tier.percent);

            match tier.predicate {
                Predicate::Always if index > 0 => {
                    return Err(CriteriaError::MisplacedFloor {
                        percent: tier.percent,
                    });
                }
                Predicate::All([]) | Predicate::Any([]) => {
                    return Err(CriteriaError::EmptyPredicate {
                        percent: tier.percent,
                    });
                }
                _ => {}
            }

            if let Some(requirement) = tier
                .predicate
                .requirements()
                .iter()
                .find(|requirement| !known_metrics.contains(&requirement.metric))
            {
                return Err(CriteriaError::UnknownMetric {
                    percent: tier.percent,
                    metric: requirement.metric,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    #[error("tier {next}% does not follow {previous}% in ascending order")]
    UnorderedTiers { previous: u8, next: u8 },
    #[error("tier {percent}% is unconditional but is not the lowest tier")]
    MisplacedFloor { percent: u8 },
    #[error("tier {percent}% has an empty predicate")]
    EmptyPredicate { percent: u8 },
    #[error("tier {percent}% references undeclared metric `{metric}`")]
    UnknownMetric { percent: u8, metric: &'static str },
}
