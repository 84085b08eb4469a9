use super::ConditionKey;
use crate::analysis::metrics::{busiest_window, rate_per_period, tally, DAYS_PER_MONTH};
use crate::analysis::{
    ConditionModule, CriteriaTable, CriteriaTier, MetricsBag, Predicate, Requirement, Threshold,
};
use crate::observations::{ConditionPayload, LogSelector, MigraineDetails, SelectedEntry, Selection};

const PROSTRATING_ATTACKS: &str = "prostrating_attacks";
const PROSTRATING_PER_MONTH: &str = "prostrating_attacks_per_month";
const PROLONGED_LAST_30_DAYS: &str = "prolonged_prostrating_attacks_30d";
const MISSED_WORK: &str = "attacks_with_missed_work";
const AURA: &str = "attacks_with_aura";

/// Attacks of at least this many hours count as prolonged.
const PROLONGED_HOURS: f32 = 4.0;
const RECENT_WINDOW_DAYS: i64 = 30;

pub(crate) static MODULE: ConditionModule = ConditionModule {
    key: ConditionKey::Migraine,
    selector: LogSelector {
        condition: ConditionKey::Migraine,
        aliases: &["headache", "migraine-headache", "migraines"],
        measurements: &[],
    },
    metrics: &[
        PROSTRATING_ATTACKS,
        PROSTRATING_PER_MONTH,
        PROLONGED_LAST_30_DAYS,
        MISSED_WORK,
        AURA,
    ],
    aggregate,
    criteria: &CRITERIA,
};

static CRITERIA: CriteriaTable = CriteriaTable {
    lowest: CriteriaTier {
        percent: 0,
        predicate: Predicate::Always,
        summary: "migraine attacks logged, prostrating attacks less frequent than every two months",
    },
    higher: &[
        CriteriaTier {
            percent: 10,
            predicate: Predicate::All(&[Requirement {
                metric: PROSTRATING_PER_MONTH,
                threshold: Threshold::AtLeast(0.5),
                evidence: "prostrating attacks per month",
            }]),
            summary: "characteristic prostrating attacks averaging one in two months",
        },
        CriteriaTier {
            percent: 30,
            predicate: Predicate::All(&[Requirement {
                metric: PROSTRATING_PER_MONTH,
                threshold: Threshold::AtLeast(1.0),
                evidence: "prostrating attacks per month",
            }]),
            summary: "characteristic prostrating attacks occurring on average once a month",
        },
        CriteriaTier {
            percent: 50,
            predicate: Predicate::All(&[Requirement {
                metric: PROLONGED_LAST_30_DAYS,
                threshold: Threshold::AtLeast(4.0),
                evidence: "prolonged prostrating attacks within 30 days",
            }]),
            summary: "very frequent completely prostrating and prolonged attacks",
        },
    ],
};

fn details<'a>(selected: &SelectedEntry<'a>) -> Option<&'a MigraineDetails> {
    match selected.payload()? {
        ConditionPayload::Migraine(details) => Some(details),
        _ => None,
    }
}

fn prostrating(selected: &SelectedEntry<'_>) -> Option<bool> {
    details(selected)?.prostrating
}

/// Prolonged if the logged hours or, failing that, the duration bucket reach the limit.
fn prolonged(selected: &SelectedEntry<'_>) -> bool {
    details(selected)
        .and_then(|details| details.duration_hours)
        .map(|hours| hours >= PROLONGED_HOURS)
        .or_else(|| {
            selected
                .entry
                .tags
                .duration
                .map(|bucket| bucket.min_hours() >= PROLONGED_HOURS)
        })
        .unwrap_or(false)
}

fn aggregate(selection: &Selection<'_>, bag: &mut MetricsBag) {
    let attacks = tally(&selection.entries, prostrating);
    bag.answered_count(PROSTRATING_ATTACKS, attacks);
    bag.number_or_unreported(
        PROSTRATING_PER_MONTH,
        (attacks.answered() > 0)
            .then(|| rate_per_period(attacks.yes, selection.span_days(), DAYS_PER_MONTH)),
    );

    let recent = busiest_window(selection, RECENT_WINDOW_DAYS, |selected| {
        prostrating(selected).map(|prostrating| prostrating && prolonged(selected))
    });
    bag.answered_count(PROLONGED_LAST_30_DAYS, recent);

    bag.answered_count(
        MISSED_WORK,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.missed_work)
        }),
    );
    bag.answered_count(
        AURA,
        tally(&selection.entries, |selected| {
            details(selected).and_then(|details| details.aura)
        }),
    );
}
