use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::criteria::{CriteriaError, CriteriaTable};
use super::evaluator::select_tier;
use super::metrics::{record_generic, MetricsBag, GENERIC_METRICS};
use super::outcome::AnalysisResult;
use super::rationale::{gaps, rationale};
use crate::conditions::{all_modules, ConditionKey};
use crate::observations::{EvidenceSnapshot, LogSelector, Selection};

/// Condition-specific fold from selected evidence into named metrics.
pub type Aggregator = fn(&Selection<'_>, &mut MetricsBag);

/// Statically registered bundle of selector, aggregator and criteria table.
pub struct ConditionModule {
    pub key: ConditionKey,
    pub selector: LogSelector,
    /// Condition-specific metrics the aggregator writes.
    pub metrics: &'static [&'static str],
    pub aggregate: Aggregator,
    pub criteria: &'static CriteriaTable,
}

impl fmt::Debug for ConditionModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionModule")
            .field("key", &self.key)
            .field("selector", &self.selector)
            .field("metrics", &self.metrics)
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

impl ConditionModule {
    pub fn analyze(&self, snapshot: &EvidenceSnapshot<'_>) -> AnalysisResult {
        let max_rating = self.criteria.max_percent();
        let selection = self.selector.select(snapshot);

        if selection.is_empty() {
            debug!(condition = self.key.slug(), "no matching evidence");
            return AnalysisResult::without_data(self.key, max_rating);
        }

        let mut metrics = MetricsBag::default();
        record_generic(&selection, &mut metrics);
        (self.aggregate)(&selection, &mut metrics);

        let decision = select_tier(self.criteria, &metrics);
        let rating_rationale = rationale(&decision, &metrics);
        let gaps = gaps(self.criteria, &decision, &metrics);

        debug!(
            condition = self.key.slug(),
            entries = selection.entries.len(),
            measurements = selection.measurements.len(),
            rating = decision.tier.percent,
            gaps = gaps.len(),
            "analyzed condition"
        );

        AnalysisResult {
            condition: self.key,
            code: self.key.code(),
            label: self.key.label(),
            has_data: true,
            supported_rating: Some(decision.tier.percent),
            next_rating: self
                .criteria
                .next_above(decision.tier.percent)
                .map(|tier| tier.percent),
            max_rating,
            rating_rationale,
            gaps,
            metrics,
        }
    }

    /// Every metric name a tier may reference: the generic set plus this module's.
    pub fn known_metrics(&self) -> Vec<&'static str> {
        GENERIC_METRICS
            .iter()
            .chain(self.metrics.iter())
            .copied()
            .collect()
    }

    pub fn validate(&self) -> Result<(), InvalidModule> {
        self.criteria
            .validate(&self.known_metrics())
            .map_err(|source| InvalidModule {
                condition: self.key,
                source,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("criteria for {condition} are invalid: {source}")]
pub struct InvalidModule {
    pub condition: ConditionKey,
    #[source]
    pub source: CriteriaError,
}

/// Typed lookup from condition key to module, populated once.
#[derive(Debug, Clone)]
pub struct ConditionRegistry {
    modules: BTreeMap<ConditionKey, &'static ConditionModule>,
}

impl ConditionRegistry {
    pub fn standard() -> Self {
        Self::from_modules(all_modules())
    }

    /// Registry restricted to the given keys.
    pub fn with_conditions<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = ConditionKey>,
    {
        let enabled: Vec<ConditionKey> = keys.into_iter().collect();
        Self::from_modules(
            all_modules()
                .into_iter()
                .filter(|module| enabled.contains(&module.key)),
        )
    }

    pub fn from_modules<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = &'static ConditionModule>,
    {
        Self {
            modules: modules
                .into_iter()
                .map(|module| (module.key, module))
                .collect(),
        }
    }

    pub fn get(&self, key: ConditionKey) -> Option<&'static ConditionModule> {
        self.modules.get(&key).copied()
    }

    /// Modules in key order.
    pub fn modules(&self) -> impl Iterator<Item = &'static ConditionModule> + '_ {
        self.modules.values().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = ConditionKey> + '_ {
        self.modules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn validate(&self) -> Result<(), InvalidModule> {
        self.modules().try_for_each(ConditionModule::validate)
    }
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_tables_validate() {
        let registry = ConditionRegistry::standard();
        assert_eq!(registry.len(), ConditionKey::ALL.len());
        registry.validate().expect("shipped criteria tables are well formed");
    }

    #[test]
    fn restricted_registry_only_holds_enabled_keys() {
        let registry =
            ConditionRegistry::with_conditions([ConditionKey::Tinnitus, ConditionKey::Migraine]);
        let keys: Vec<ConditionKey> = registry.keys().collect();

        assert_eq!(keys, vec![ConditionKey::Migraine, ConditionKey::Tinnitus]);
        assert!(registry.get(ConditionKey::Asthma).is_none());
    }

    #[test]
    fn module_metric_names_do_not_shadow_generic_ones() {
        for module in ConditionRegistry::standard().modules() {
            for metric in module.metrics {
                assert!(
                    !GENERIC_METRICS.contains(metric),
                    "{} redeclares generic metric {metric}",
                    module.key
                );
            }
        }
    }
}
