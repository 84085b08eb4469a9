use super::ConditionKey;
use crate::analysis::metrics::{days_answered_yes, rate_per_period, tally, Tally, DAYS_PER_WEEK};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{ConditionPayload, LogSelector, MoodDetails, SelectedEntry, Selection};

const SYMPTOMATIC_ENTRIES: &str = "symptomatic_entries";
const PANIC_ATTACKS: &str = "panic_attacks";
const PANIC_PER_WEEK: &str = "panic_attacks_per_week";
const DEPRESSED_MOOD: &str = "depressed_mood_entries";
const MEMORY_IMPAIRMENT: &str = "memory_impairment_entries";
const SUICIDAL_IDEATION: &str = "suicidal_ideation_reports";
const IMPULSE_CONTROL: &str = "impaired_impulse_control_reports";
const HALLUCINATIONS: &str = "hallucination_reports";
const SELF_CARE_NEGLECT: &str = "self_care_neglect_reports";
const SLEEP_IMPAIRMENT_SHARE: &str = "sleep_impairment_share";
const MISSED_WORK_DAYS: &str = "missed_work_days";

const fn reported(metric: &'static str, evidence: &'static str) -> Requirement {
    Requirement {
        metric,
        threshold: Threshold::AtLeast(1.0),
        evidence,
    }
}

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::Ptsd,
    selector: LogSelector {
        condition: ConditionKey::Ptsd,
        aliases: &["post-traumatic-stress", "post-traumatic-stress-disorder", "posttraumatic-stress"],
        measurements: &[],
    },
    metrics: &[
        SYMPTOMATIC_ENTRIES,
        PANIC_ATTACKS,
        PANIC_PER_WEEK,
        DEPRESSED_MOOD,
        MEMORY_IMPAIRMENT,
        SUICIDAL_IDEATION,
        IMPULSE_CONTROL,
        HALLUCINATIONS,
        SELF_CARE_NEGLECT,
        SLEEP_IMPAIRMENT_SHARE,
        MISSED_WORK_DAYS,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "mental health entries logged without symptoms that affect functioning",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::Any(&[reported(
                SYMPTOMATIC_ENTRIES,
                "entries with a documented symptom",
            )]),
            summary: "mild or transient symptoms",
        },
        CriteriaTier {
            percent: 30,
            predicate: Predicate::Any(&[
                reported(PANIC_ATTACKS, "panic attacks"),
                Requirement {
                    metric: DEPRESSED_MOOD,
                    threshold: Threshold::AtLeast(4.0),
                    evidence: "entries with depressed mood",
                },
                Requirement {
                    metric: SLEEP_IMPAIRMENT_SHARE,
                    threshold: Threshold::AtLeast(0.5),
                    evidence: "share of entries with sleep impairment",
                },
                reported(MEMORY_IMPAIRMENT, "entries with memory loss"),
            ]),
            summary: "occasional decrease in work efficiency with depressed mood, panic attacks, chronic sleep impairment or mild memory loss",
        },
        CriteriaTier {
            percent: 50,
            predicate: Predicate::Any(&[
                Requirement {
                    metric: PANIC_PER_WEEK,
                    threshold: Threshold::Above(1.0),
                    evidence: "panic attacks per week",
                },
                Requirement {
                    metric: MISSED_WORK_DAYS,
                    threshold: Threshold::AtLeast(4.0),
                    evidence: "days of missed work",
                },
            ]),
            summary: "reduced reliability and productivity with panic attacks more than once a week",
        },
        CriteriaTier {
            percent: 70,
            predicate: Predicate::Any(&[
                reported(SUICIDAL_IDEATION, "reports of suicidal ideation"),
                reported(IMPULSE_CONTROL, "reports of impaired impulse control"),
                Requirement {
                    metric: PANIC_PER_WEEK,
                    threshold: Threshold::AtLeast(5.0),
                    evidence: "panic attacks per week",
                },
                reported(SELF_CARE_NEGLECT, "reports of neglected personal hygiene"),
            ]),
            summary: "deficiencies in most areas with suicidal ideation, impaired impulse control, near-continuous panic or neglect of personal care",
        },
        CriteriaTier {
            percent: 100,
            predicate: Predicate::All(&[reported(
                HALLUCINATIONS,
                "reports of persistent delusions or hallucinations",
            )]),
            summary: "total occupational and social impairment with persistent delusions or hallucinations",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a MoodDetails> {
    match selected.payload()? {
        ConditionPayload::Mood(details) => Some(details),
        _ => None,
    }
}

fn symptom(selection: &Selection<'_>, pick: fn(&MoodDetails) -> Option<bool>) -> Tally {
    tally(&selection.entries, |selected| details(selected).and_then(pick))
}

fn symptoms(details: &MoodDetails) -> [Option<bool>; 8] {
    [
        details.panic_attack,
        details.depressed_mood,
        details.sleep_impairment,
        details.memory_impairment,
        details.suicidal_ideation,
        details.impaired_impulse_control,
        details.hallucinations,
        details.self_care_neglect,
    ]
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    bag.answered_count(
        SYMPTOMATIC_ENTRIES,
        tally(&selection.entries, |selected| {
            let symptoms = symptoms(details(selected)?);
            if symptoms.contains(&Some(true)) {
                Some(true)
            } else if symptoms.iter().any(Option::is_some) {
                Some(false)
            } else {
                None
            }
        }),
    );

    let panic = symptom(selection, |details| details.panic_attack);
    bag.answered_count(PANIC_ATTACKS, panic);
    bag.number_or_unreported(
        PANIC_PER_WEEK,
        (panic.answered() > 0)
            .then(|| rate_per_period(panic.yes, selection.span_days(), DAYS_PER_WEEK)),
    );

    bag.answered_count(DEPRESSED_MOOD, symptom(selection, |details| details.depressed_mood));
    bag.answered_count(
        MEMORY_IMPAIRMENT,
        symptom(selection, |details| details.memory_impairment),
    );
    bag.answered_count(
        SUICIDAL_IDEATION,
        symptom(selection, |details| details.suicidal_ideation),
    );
    bag.answered_count(
        IMPULSE_CONTROL,
        symptom(selection, |details| details.impaired_impulse_control),
    );
    bag.answered_count(HALLUCINATIONS, symptom(selection, |details| details.hallucinations));
    bag.answered_count(
        SELF_CARE_NEGLECT,
        symptom(selection, |details| details.self_care_neglect),
    );
    bag.answered_share(
        SLEEP_IMPAIRMENT_SHARE,
        symptom(selection, |details| details.sleep_impairment),
    );
    bag.count_or_unreported(
        MISSED_WORK_DAYS,
        days_answered_yes(&selection.entries, |selected| {
            details(selected).and_then(|details| details.missed_work)
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MetricValue;
    use crate::observations::{EvidenceSnapshot, ObservationEntry};

    fn mood(id: &str, timestamp: &str, details: MoodDetails) -> ObservationEntry {
        ObservationEntry::new(id, timestamp, 6).with_payload(ConditionPayload::Mood(details))
    }

    fn panic(id: &str, timestamp: &str) -> ObservationEntry {
        mood(
            id,
            timestamp,
            MoodDetails {
                panic_attack: Some(true),
                ..MoodDetails::default()
            },
        )
    }

    #[test]
    fn calm_entries_stay_at_the_floor() {
        let entries = vec![mood(
            "a",
            "2025-02-01",
            MoodDetails {
                panic_attack: Some(false),
                depressed_mood: Some(false),
                ..MoodDetails::default()
            },
        )];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(0));
        assert_eq!(result.metrics.get(SYMPTOMATIC_ENTRIES), Some(&MetricValue::Count(0)));
        assert_eq!(
            result.gaps,
            vec!["document 1 more entries with a documented symptom (currently 0, need 1) to reach 10%".to_string()]
        );
    }

    #[test]
    fn more_than_weekly_panic_supports_fifty_percent() {
        let entries = vec![
            panic("a", "2025-02-01"),
            panic("b", "2025-02-02"),
            panic("c", "2025-02-04"),
            panic("d", "2025-02-06"),
            panic("e", "2025-02-08"),
            panic("f", "2025-02-10"),
            panic("g", "2025-02-14"),
        ];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        // 7 attacks over 13 days.
        assert_eq!(result.supported_rating, Some(50));
        assert_eq!(result.gaps.len(), 1);
        assert!(result.gaps[0].contains("panic attacks per week"));
        assert!(result.gaps[0].ends_with("to reach 70%"));
    }

    #[test]
    fn hallucinations_reach_the_maximum() {
        let entries = vec![mood(
            "a",
            "2025-02-01",
            MoodDetails {
                hallucinations: Some(true),
                ..MoodDetails::default()
            },
        )];

        let result = MODULE.analyze(&EvidenceSnapshot::new(&entries));

        assert_eq!(result.supported_rating, Some(100));
        assert!(result.gaps.is_empty());
    }
}
