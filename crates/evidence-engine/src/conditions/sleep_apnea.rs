use super::ConditionKey;
use crate::analysis::metrics::{days_answered_yes, tally};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{ConditionPayload, LogSelector, SelectedEntry, Selection, SleepDetails};

const HYPERSOMNOLENCE_DAYS: &str = "hypersomnolence_days";
const HYPERSOMNOLENCE_SHARE: &str = "hypersomnolence_share";
const BREATHING_DEVICE_NIGHTS: &str = "breathing_device_nights";
const RESPIRATORY_FAILURE: &str = "respiratory_failure_reports";
const AVERAGE_HOURS_SLEPT: &str = "average_hours_slept";

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::SleepApnea,
    selector: LogSelector {
        condition: ConditionKey::SleepApnea,
        aliases: &["sleep-apnoea", "osa", "obstructive-sleep-apnea"],
        measurements: &[],
    },
    metrics: &[
        HYPERSOMNOLENCE_DAYS,
        HYPERSOMNOLENCE_SHARE,
        BREATHING_DEVICE_NIGHTS,
        RESPIRATORY_FAILURE,
        AVERAGE_HOURS_SLEPT,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "sleep-disordered breathing logged without qualifying symptoms",
    },
    higher: &[
        CriteriaTier {
            percent: 30,
            predicate: Predicate::All(&[
                Requirement {
                    metric: HYPERSOMNOLENCE_DAYS,
                    threshold: Threshold::AtLeast(3.0),
                    evidence: "days with daytime hypersomnolence",
                },
                Requirement {
                    metric: HYPERSOMNOLENCE_SHARE,
                    threshold: Threshold::AtLeast(0.5),
                    evidence: "share of logged days with daytime hypersomnolence",
                },
            ]),
            summary: "persistent daytime hypersomnolence",
        },
        CriteriaTier {
            percent: 50,
            predicate: Predicate::All(&[Requirement {
                metric: BREATHING_DEVICE_NIGHTS,
                threshold: Threshold::AtLeast(1.0),
                evidence: "nights using a breathing assistance device",
            }]),
            summary: "requires use of a breathing assistance device such as CPAP",
        },
        CriteriaTier {
            percent: 100,
            predicate: Predicate::All(&[Requirement {
                metric: RESPIRATORY_FAILURE,
                threshold: Threshold::AtLeast(1.0),
                evidence: "reports of chronic respiratory failure",
            }]),
            summary: "chronic respiratory failure with carbon dioxide retention",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a SleepDetails> {
    match selected.payload()? {
        ConditionPayload::Sleep(details) => Some(details),
        _ => None,
    }
}

fn hypersomnolence(selected: &SelectedEntry<'_>) -> Option<bool> {
    details(selected)?.daytime_hypersomnolence
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    bag.count_or_unreported(
        HYPERSOMNOLENCE_DAYS,
        days_answered_yes(&selection.entries, hypersomnolence),
    );
    bag.answered_share(
        HYPERSOMNOLENCE_SHARE,
        tally(&selection.entries, hypersomnolence),
    );
    bag.answered_count(
        BREATHING_DEVICE_NIGHTS,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.breathing_device_used)
        }),
    );
    bag.answered_count(
        RESPIRATORY_FAILURE,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.respiratory_failure)
        }),
    );

    let hours: Vec<f64> = selection
        .entries
        .iter()
        .filter_map(|selected| details(selected).and_then(|details| details.hours_slept))
        .filter(|hours| hours.is_finite() && *hours >= 0.0)
        .map(f64::from)
        .collect();
    bag.number_or_unreported(
        AVERAGE_HOURS_SLEPT,
        (!hours.is_empty()).then(|| hours.iter().sum::<f64>() / hours.len() as f64),
    );
}
