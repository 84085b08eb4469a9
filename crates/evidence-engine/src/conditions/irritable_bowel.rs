use std::collections::BTreeSet;

use chrono::Datelike;

use super::ConditionKey;
use crate::analysis::metrics::{most_frequent, rate_per_period, DAYS_PER_MONTH};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{
    ConditionPayload, GastrointestinalDetails, LogSelector, SelectedEntry, Selection,
};

const ABDOMINAL_PAIN_DAYS: &str = "abdominal_pain_days";
const QUALIFYING_DAYS: &str = "qualifying_pain_days";
const QUALIFYING_PER_MONTH: &str = "qualifying_pain_days_per_month";
const MONTHS_DOCUMENTED: &str = "months_documented";
const STOOL_PATTERN: &str = "most_common_stool_pattern";

/// Associated features a pain day needs for it to qualify.
const REQUIRED_FEATURES: usize = 2;

const THREE_MONTHS: Requirement = Requirement {
    metric: MONTHS_DOCUMENTED,
    threshold: Threshold::AtLeast(3.0),
    evidence: "calendar months of documented symptoms",
};

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::IrritableBowel,
    selector: LogSelector {
        condition: ConditionKey::IrritableBowel,
        aliases: &["ibs", "irritable-bowel-syndrome"],
        measurements: &[],
    },
    metrics: &[
        ABDOMINAL_PAIN_DAYS,
        QUALIFYING_DAYS,
        QUALIFYING_PER_MONTH,
        MONTHS_DOCUMENTED,
        STOOL_PATTERN,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "bowel symptoms logged below the recurring abdominal pain threshold",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::All(&[
                Requirement {
                    metric: QUALIFYING_PER_MONTH,
                    threshold: Threshold::AtLeast(1.0),
                    evidence: "qualifying abdominal pain days per month",
                },
                THREE_MONTHS,
            ]),
            summary: "abdominal pain at least one day a month for three months with two associated symptoms",
        },
        CriteriaTier {
            percent: 20,
            predicate: Predicate::All(&[
                Requirement {
                    metric: QUALIFYING_PER_MONTH,
                    threshold: Threshold::AtLeast(2.0),
                    evidence: "qualifying abdominal pain days per month",
                },
                THREE_MONTHS,
            ]),
            summary: "abdominal pain at least two days a month for three months with two associated symptoms",
        },
        CriteriaTier {
            percent: 30,
            predicate: Predicate::All(&[
                Requirement {
                    metric: QUALIFYING_PER_MONTH,
                    threshold: Threshold::AtLeast(4.0),
                    evidence: "qualifying abdominal pain days per month",
                },
                THREE_MONTHS,
            ]),
            summary: "abdominal pain at least once a week for three months with two associated symptoms",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a GastrointestinalDetails> {
    match selected.payload()? {
        ConditionPayload::Gastrointestinal(details) => Some(details),
        _ => None,
    }
}

fn associated_features(details: &GastrointestinalDetails) -> usize {
    [
        details.related_to_defecation,
        details.stool_frequency_change,
        details.stool_form_change,
    ]
    .into_iter()
    .filter(|feature| *feature == Some(true))
    .count()
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let mut answered = false;
    let mut pain_days = BTreeSet::new();
    let mut qualifying_days = BTreeSet::new();

    for selected in &selection.entries {
        let Some(details) = details(selected) else {
            continue;
        };
        match details.abdominal_pain {
            Some(true) => {
                answered = true;
                let day = selected.recorded_at.date();
                pain_days.insert(day);
                if associated_features(details) >= REQUIRED_FEATURES {
                    qualifying_days.insert(day);
                }
            }
            Some(false) => answered = true,
            None => {}
        }
    }

    bag.count_or_unreported(ABDOMINAL_PAIN_DAYS, answered.then_some(pain_days.len()));
    bag.count_or_unreported(QUALIFYING_DAYS, answered.then_some(qualifying_days.len()));
    bag.number_or_unreported(
        QUALIFYING_PER_MONTH,
        answered.then(|| {
            rate_per_period(qualifying_days.len(), selection.span_days(), DAYS_PER_MONTH)
        }),
    );

    // Only months with reported pain count; denials and bare tags do not.
    let months: BTreeSet<(i32, u32)> = pain_days
        .iter()
        .map(|day| (day.year(), day.month()))
        .collect();
    bag.count_or_unreported(MONTHS_DOCUMENTED, answered.then_some(months.len()));

    bag.category(
        STOOL_PATTERN,
        most_frequent(
            selection
                .entries
                .iter()
                .filter_map(|selected| details(selected).and_then(|details| details.stool_pattern))
                .map(|pattern| pattern.label()),
        ),
    );
}
