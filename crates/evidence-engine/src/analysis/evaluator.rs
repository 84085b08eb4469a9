use tracing::debug;

use super::criteria::{CriteriaTable, CriteriaTier};
use super::metrics::MetricsBag;

/// Tier chosen for a metrics bag, and whether its predicate actually held.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TierDecision<'t> {
    pub tier: &'t CriteriaTier,
    /// `false` when nothing held and the lowest tier was used as a fallback.
    pub matched: bool,
}

/// Scan highest to lowest and stop at the first tier whose predicate holds.
///
/// Predicates may overlap, so an ascending scan would stop at a looser tier.
pub(crate) fn select_tier<'t>(table: &'t CriteriaTable, bag: &MetricsBag) -> TierDecision<'t> {
    match table.tiers().rev().find(|tier| tier.predicate.holds(bag)) {
        Some(tier) => {
            debug!(percent = tier.percent, "tier predicate satisfied");
            TierDecision {
                tier,
                matched: true,
            }
        }
        None => {
            debug!(
                percent = table.lowest.percent,
                "no tier predicate satisfied, using lowest tier"
            );
            TierDecision {
                tier: &table.lowest,
                matched: false,
            }
        }
    }
}
