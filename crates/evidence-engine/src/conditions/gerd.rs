use super::ConditionKey;
use crate::analysis::metrics::{rate_per_period, tally, Tally, DAYS_PER_MONTH};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{ConditionPayload, LogSelector, RefluxDetails, SelectedEntry, Selection};

const HEARTBURN: &str = "heartburn_episodes";
const REGURGITATION: &str = "regurgitation_episodes";
const DYSPHAGIA: &str = "dysphagia_episodes";
const SUBSTERNAL_PAIN: &str = "substernal_pain_episodes";
const VOMITING: &str = "vomiting_episodes";
const HEMATEMESIS_OR_MELENA: &str = "hematemesis_or_melena_episodes";
const WEIGHT_LOSS: &str = "weight_loss_reports";
const DISTINCT_CORE_SYMPTOMS: &str = "distinct_core_symptoms";
const EPISODES_PER_MONTH: &str = "reflux_episodes_per_month";

const fn documented(metric: &'static str, evidence: &'static str) -> Requirement {
    Requirement {
        metric,
        threshold: Threshold::AtLeast(1.0),
        evidence,
    }
}

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::Gerd,
    selector: LogSelector {
        condition: ConditionKey::Gerd,
        aliases: &["acid-reflux", "reflux", "heartburn", "gastroesophageal-reflux"],
        measurements: &[],
    },
    metrics: &[
        HEARTBURN,
        REGURGITATION,
        DYSPHAGIA,
        SUBSTERNAL_PAIN,
        VOMITING,
        HEMATEMESIS_OR_MELENA,
        WEIGHT_LOSS,
        DISTINCT_CORE_SYMPTOMS,
        EPISODES_PER_MONTH,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "reflux symptoms logged below the compensable threshold",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::All(&[Requirement {
                metric: DISTINCT_CORE_SYMPTOMS,
                threshold: Threshold::AtLeast(2.0),
                evidence: "distinct core reflux symptoms",
            }]),
            summary: "two or more core reflux symptoms of lesser severity",
        },
        CriteriaTier {
            percent: 30,
            predicate: Predicate::All(&[
                documented(DYSPHAGIA, "episodes of dysphagia"),
                documented(HEARTBURN, "episodes of heartburn"),
                documented(REGURGITATION, "episodes of regurgitation"),
                documented(SUBSTERNAL_PAIN, "episodes of substernal pain"),
                Requirement {
                    metric: EPISODES_PER_MONTH,
                    threshold: Threshold::AtLeast(4.0),
                    evidence: "symptomatic reflux episodes per month",
                },
            ]),
            summary: "persistently recurrent epigastric distress with dysphagia, pyrosis and regurgitation, accompanied by substernal pain",
        },
        CriteriaTier {
            percent: 60,
            predicate: Predicate::All(&[
                documented(VOMITING, "episodes of vomiting"),
                documented(HEMATEMESIS_OR_MELENA, "episodes of hematemesis or melena"),
                documented(WEIGHT_LOSS, "reports of material weight loss"),
            ]),
            summary: "vomiting, material weight loss and hematemesis or melena",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a RefluxDetails> {
    match selected.payload()? {
        ConditionPayload::Reflux(details) => Some(details),
        _ => None,
    }
}

fn core_symptoms(details: &RefluxDetails) -> [Option<bool>; 4] {
    [
        details.heartburn,
        details.regurgitation,
        details.dysphagia,
        details.substernal_pain,
    ]
}

fn symptom(selection: &Selection<'_>, pick: fn(&RefluxDetails) -> Option<bool>) -> Tally {
    tally(&selection.entries, |selected| details(selected).and_then(pick))
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let heartburn = symptom(selection, |details| details.heartburn);
    let regurgitation = symptom(selection, |details| details.regurgitation);
    let dysphagia = symptom(selection, |details| details.dysphagia);
    let substernal = symptom(selection, |details| details.substernal_pain);

    bag.answered_count(HEARTBURN, heartburn);
    bag.answered_count(REGURGITATION, regurgitation);
    bag.answered_count(DYSPHAGIA, dysphagia);
    bag.answered_count(SUBSTERNAL_PAIN, substernal);
    bag.answered_count(VOMITING, symptom(selection, |details| details.vomiting));
    bag.answered_count(
        HEMATEMESIS_OR_MELENA,
        symptom(selection, |details| details.hematemesis_or_melena),
    );
    bag.answered_count(WEIGHT_LOSS, symptom(selection, |details| details.weight_loss));

    let core = [heartburn, regurgitation, dysphagia, substernal];
    let any_core_answered = core.iter().any(|tally| tally.answered() > 0);
    bag.count_or_unreported(
        DISTINCT_CORE_SYMPTOMS,
        any_core_answered.then(|| core.iter().filter(|tally| tally.yes > 0).count()),
    );

    let episodes = tally(&selection.entries, |selected| {
        let symptoms = core_symptoms(details(selected)?);
        if symptoms.contains(&Some(true)) {
            Some(true)
        } else if symptoms.iter().any(Option::is_some) {
            Some(false)
        } else {
            None
        }
    });
    bag.number_or_unreported(
        EPISODES_PER_MONTH,
        (episodes.answered() > 0)
            .then(|| rate_per_period(episodes.yes, selection.span_days(), DAYS_PER_MONTH)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MetricValue;
    use crate::observations::{EvidenceSnapshot, ObservationEntry};

    fn reflux(id: &str, timestamp: &str, details: RefluxDetails) -> ObservationEntry {
        ObservationEntry::new(id, timestamp, 5).with_payload(ConditionPayload::Reflux(details))
    }

    fn full_picture() -> RefluxDetails {
        RefluxDetails {
            heartburn: Some(true),
            regurgitation: Some(true),
            dysphagia: Some(true),
            substernal_pain: Some(true),
            ..RefluxDetails::default()
        }
    }

    #[test]
    fn two_core_symptoms_support_ten_percent() {
        let entries = vec![
            reflux(
                "a",
                "2025-03-01",
                RefluxDetails {
                    heartburn: Some(true),
                    dysphagia: Some(false),
                    ..RefluxDetails::default()
                },
            ),
            reflux(
                "b",
                "2025-03-04",
                RefluxDetails {
                    regurgitation: Some(true),
                    ..RefluxDetails::default()
                },
            ),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(10));
        assert_eq!(result.metrics.get(DYSPHAGIA), Some(&MetricValue::Count(0)));
        assert_eq!(result.metrics.get(SUBSTERNAL_PAIN), Some(&MetricValue::Unreported));
        assert!(result
            .gaps
            .contains(&"record episodes of substernal pain (not yet reported) to reach 30%".to_string()));
        assert!(result
            .gaps
            .contains(&"document 1 more episodes of dysphagia (currently 0, need 1) to reach 30%".to_string()));
    }

    #[test]
    fn weekly_full_picture_supports_thirty_percent() {
        let entries = vec![
            reflux("a", "2025-03-01", full_picture()),
            reflux("b", "2025-03-08", full_picture()),
            reflux("c", "2025-03-15", full_picture()),
            reflux("d", "2025-03-22", full_picture()),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(30));
        assert_eq!(result.gaps.len(), 3);
    }

    #[test]
    fn severe_triad_supports_sixty_percent() {
        let entries = vec![reflux(
            "a",
            "2025-03-01",
            RefluxDetails {
                vomiting: Some(true),
                hematemesis_or_melena: Some(true),
                weight_loss: Some(true),
                ..RefluxDetails::default()
            },
        )];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(60));
        assert!(result.gaps.is_empty());
    }
}
