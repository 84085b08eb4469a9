use super::ConditionKey;
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{LogSelector, Selection};

const EPISODES: &str = "tinnitus_episodes";

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::Tinnitus,
    selector: LogSelector {
        condition: ConditionKey::Tinnitus,
        aliases: &["ringing-in-ears", "ear-ringing", "ringing-ears"],
        measurements: &[],
    },
    metrics: &[EPISODES],
    aggregate,
    criteria: &CRITERIA,
};

/// Single explicit tier and no floor: any logged tinnitus resolves to 10%.
static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 10,
        predicate: Predicate::All(&[Requirement {
            metric: EPISODES,
            threshold: Threshold::AtLeast(2.0),
            evidence: "tinnitus episodes",
        }]),
        summary: "recurrent tinnitus",
    },
    higher: &[],
};

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    bag.count(EPISODES, selection.entries.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::{EvidenceSnapshot, ObservationEntry};

    #[test]
    fn single_episode_falls_back_to_the_only_tier() {
        let entries = vec![ObservationEntry::new("a", "2025-01-01", 3).tagged("Ringing in ears")];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(10));
        assert!(result.gaps.is_empty());
        assert!(result.rating_rationale[1].starts_with("No tier criteria met"));
    }

    #[test]
    fn recurring_episodes_match_the_tier() {
        let entries = vec![
            ObservationEntry::new("a", "2025-01-01", 3).tagged("tinnitus"),
            ObservationEntry::new("b", "2025-01-09", 4).tagged("6260"),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(10));
        assert_eq!(result.rating_rationale[1], "tinnitus episodes: 2 (meets at least 2)");
    }
}
